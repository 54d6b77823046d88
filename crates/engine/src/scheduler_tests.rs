// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::hooks::HookRegistry;
use std::sync::atomic::{AtomicUsize, Ordering};
use warble_core::FuncSpec;

fn cron_def(name: &str, target: &str, interval_secs: f64, now: bool) -> CronDef {
    CronDef {
        name: name.into(),
        target: FuncSpec::parse(target).unwrap(),
        interval_secs,
        now,
    }
}

fn counting_hooks(key: &str, counter: Arc<AtomicUsize>) -> HookRegistry {
    let mut hooks = HookRegistry::new();
    hooks.register_cron(key, move |_ctx| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    hooks
}

#[tokio::test(start_paused = true)]
async fn now_fires_immediately() {
    let calls = Arc::new(AtomicUsize::new(0));
    let hooks = counting_hooks("h:tick", calls.clone());
    let defs = [cron_def("tick", "h:tick()", 60.0, true)];

    let scheduler = Scheduler::start(&defs, &hooks, Publisher::disconnected());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    scheduler.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn without_now_waits_one_interval() {
    let calls = Arc::new(AtomicUsize::new(0));
    let hooks = counting_hooks("h:tick", calls.clone());
    let defs = [cron_def("tick", "h:tick()", 60.0, false)];

    let scheduler = Scheduler::start(&defs, &hooks, Publisher::disconnected());
    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    scheduler.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn reschedules_every_interval() {
    let calls = Arc::new(AtomicUsize::new(0));
    let hooks = counting_hooks("h:tick", calls.clone());
    let defs = [cron_def("tick", "h:tick()", 10.0, true)];

    let scheduler = Scheduler::start(&defs, &hooks, Publisher::disconnected());
    tokio::time::sleep(Duration::from_secs(35)).await;
    // t=0, 10, 20, 30
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    scheduler.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn failing_task_is_rescheduled() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut hooks = HookRegistry::new();
    let counter = calls.clone();
    hooks.register_cron("h:flaky", move |_ctx| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(crate::hooks::HookError::failed("flaky"))
        }
    });
    let defs = [cron_def("flaky", "h:flaky()", 10.0, true)];

    let scheduler = Scheduler::start(&defs, &hooks, Publisher::disconnected());
    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    scheduler.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_future_invocations() {
    let calls = Arc::new(AtomicUsize::new(0));
    let hooks = counting_hooks("h:tick", calls.clone());
    let defs = [cron_def("tick", "h:tick()", 10.0, true)];

    let scheduler = Scheduler::start(&defs, &hooks, Publisher::disconnected());
    tokio::time::sleep(Duration::from_secs(5)).await;
    scheduler.cancel().await;

    let after_cancel = calls.load(Ordering::SeqCst);
    assert_eq!(after_cancel, 1);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after_cancel);
}

#[tokio::test(start_paused = true)]
async fn unregistered_target_is_skipped() {
    let hooks = HookRegistry::new();
    let defs = [cron_def("ghost", "h:ghost()", 10.0, true)];
    let scheduler = Scheduler::start(&defs, &hooks, Publisher::disconnected());
    assert_eq!(scheduler.task_count(), 0);
    scheduler.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn reschedule_is_relative_to_invocation_start() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut hooks = HookRegistry::new();
    let counter = calls.clone();
    // The task body takes 4 seconds; the next fire is still 10 seconds
    // after the previous start, not 10 after its end
    hooks.register_cron("h:slow", move |_ctx| {
        let counter = counter.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    let defs = [cron_def("slow", "h:slow()", 10.0, true)];

    let scheduler = Scheduler::start(&defs, &hooks, Publisher::disconnected());
    // starts at t=0 (done 4), t=10 (done 14), t=20 (done 24)
    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    scheduler.cancel().await;
}
