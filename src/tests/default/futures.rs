use core::{
    pin::pin,
    task::{Context, Poll},
};

use futures_test::task::new_count_waker;

use crate::{RendezvousGroup, tests::utils::Counter};

#[cfg_attr(not(loom), test)]
pub fn test_wait_future_empty_group() {
    let (waker, counter) = new_count_waker();
    let mut cx = Context::from_waker(&waker);
    let group = RendezvousGroup::new();
    let mut wait = pin!(group.wait_async());
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Ready(()));
    assert!(wait.is_terminated());
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Ready(()));
    assert_eq!(counter.get(), 0);
}

#[cfg_attr(not(loom), test)]
pub fn test_wait_future_woken_by_completion() {
    let (waker, counter) = new_count_waker();
    let mut cx = Context::from_waker(&waker);
    let group = RendezvousGroup::new();
    group.register(1);
    let mut wait = pin!(group.wait_async());
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Pending);
    assert!(!wait.is_terminated());

    group.launch(|_| ()).join().unwrap();

    assert_eq!(counter.get(), 1);
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Ready(()));
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Ready(()));
    assert_eq!(counter.get(), 1);
}

#[cfg_attr(not(loom), test)]
pub fn test_wait_future_repoll_same_waker() {
    let (waker, counter) = new_count_waker();
    let mut cx = Context::from_waker(&waker);
    let group = RendezvousGroup::new();
    group.register(1);
    let mut wait = pin!(group.wait_async());
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Pending);
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Pending);

    group.launch(|_| ()).join().unwrap();

    assert_eq!(counter.get(), 1);
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Ready(()));
}

#[cfg_attr(not(loom), test)]
pub fn test_wait_future_polled_by_others() {
    let (waker_a, counter_a) = new_count_waker();
    let (waker_b, counter_b) = new_count_waker();
    let group = RendezvousGroup::new();
    group.register(2);

    let mut wait_a = pin!(group.wait_async());
    let mut wait_b = pin!(group.wait_async());
    let mut cx_a = Context::from_waker(&waker_a);
    let mut cx_b = Context::from_waker(&waker_b);
    assert_eq!(wait_a.as_mut().poll(&mut cx_a), Poll::Pending);
    assert_eq!(wait_b.as_mut().poll(&mut cx_b), Poll::Pending);

    group.launch(|_| ()).join().unwrap();
    assert_eq!(counter_a.get(), 0);
    assert_eq!(counter_b.get(), 0);

    group.launch(|_| ()).join().unwrap();
    assert_eq!(counter_a.get(), 1);
    assert_eq!(counter_b.get(), 1);

    assert_eq!(wait_a.as_mut().poll(&mut cx_a), Poll::Ready(()));
    assert_eq!(wait_b.as_mut().poll(&mut cx_b), Poll::Ready(()));
}

#[cfg_attr(not(loom), test)]
pub fn test_wait_future_drop_releases_slot() {
    let group = RendezvousGroup::new();
    group.register(1);
    for _ in 0..8 {
        let (waker, _) = new_count_waker();
        let mut cx = Context::from_waker(&waker);
        let mut wait = pin!(group.wait_async());
        assert_eq!(wait.as_mut().poll(&mut cx), Poll::Pending);
        assert_eq!(wait.as_mut().poll(&mut cx), Poll::Pending);
        assert_eq!(group.waker_slots(), 1);
    }
    assert_eq!(group.waker_slots(), 0);

    let (waker, counter) = new_count_waker();
    let mut cx = Context::from_waker(&waker);
    let mut wait = pin!(group.wait_async());
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Pending);
    group.launch(|_| ()).join().unwrap();
    assert_eq!(counter.get(), 1);
    assert_eq!(wait.as_mut().poll(&mut cx), Poll::Ready(()));
    assert_eq!(group.waker_slots(), 0);
}

#[cfg_attr(not(loom), test)]
pub fn test_wait_future_repoll_new_waker() {
    let (first, first_counter) = new_count_waker();
    let (second, second_counter) = new_count_waker();
    let group = RendezvousGroup::new();
    group.register(1);
    let mut wait = pin!(group.wait_async());
    assert_eq!(wait.as_mut().poll(&mut Context::from_waker(&first)), Poll::Pending);
    assert_eq!(wait.as_mut().poll(&mut Context::from_waker(&second)), Poll::Pending);
    assert_eq!(group.waker_slots(), 1);

    group.launch(|_| ()).join().unwrap();
    assert_eq!(first_counter.get(), 0);
    assert_eq!(second_counter.get(), 1);
}

#[cfg_attr(not(loom), futures_test::test)]
pub async fn test_wait_future_await() {
    let group = RendezvousGroup::new();
    let increments = Counter::new(0);
    group.register(2);
    for _ in 0..2 {
        let increments = increments.clone();
        group.launch(move |member| {
            member.rendezvous();
            increments.add(2);
        });
    }
    group.wait_async().await;
    assert_eq!(increments.load(), 4);
    assert!(group.is_done());
}
