use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use taskgate::{
    CancelContext, Event, EventKind, Queue, QueueConfig, QueueContext, RepeatContext,
    RetryOptions, Subscribe, Task, TaskError, do_repeat, with_cancellation, with_retries,
    with_timeout,
};

fn fast(concurrency: usize) -> QueueConfig {
    QueueConfig {
        concurrency,
        action_interval: Duration::from_millis(5),
        next_actions_interval: Duration::from_millis(5),
        ..QueueConfig::default()
    }
}

#[derive(Default)]
struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.kinds.lock().push(ev.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn queued_bodies_retry_timed_out_calls() {
    let queue = Queue::new(fast(2)).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..3usize)
        .map(|n| {
            let calls = calls.clone();
            queue.enqueue(Task::from_fn(move |_ctx: QueueContext| {
                let calls = calls.clone();
                async move {
                    let attempts = AtomicUsize::new(0);
                    with_retries(
                        || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            // First call of every item hangs past the deadline.
                            let slow = attempts.fetch_add(1, Ordering::SeqCst) == 0;
                            let op = Task::from_fn(move |()| async move {
                                if slow {
                                    tokio::time::sleep(Duration::from_millis(200)).await;
                                }
                                Ok(n)
                            });
                            with_timeout(op, Duration::from_millis(20))
                        },
                        RetryOptions::new(3),
                    )
                    .await
                }
            }))
        })
        .collect();

    let mut results = Vec::new();
    for h in handles {
        results.push(h.await.unwrap());
    }
    assert_eq!(results, vec![0, 1, 2]);
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn exhausted_retries_surface_on_the_handle() {
    let queue = Queue::new(fast(1)).unwrap();
    let handle = queue.enqueue(Task::from_fn(|_ctx: QueueContext| async {
        with_retries(
            || async { Err::<(), _>(TaskError::fail("unreachable host")) },
            2,
        )
        .await
    }));

    match handle.await {
        Err(TaskError::MaximumTriesReached { errors }) => {
            assert_eq!(errors.len(), 3);
            assert!(errors.iter().all(|a| a.error.as_label() == "task_failed"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn subscribers_observe_queue_lifecycle() {
    let rec = Arc::new(Recorder::default());
    let queue = Queue::builder(fast(1))
        .with_subscribers(vec![rec.clone()])
        .build()
        .unwrap();

    let ok = queue.enqueue(Task::sync(|_ctx| Ok(())));
    let bad = queue.enqueue(Task::sync(|_ctx| Err::<(), _>(TaskError::fail("x"))));
    ok.await.unwrap();
    bad.await.unwrap_err();

    tokio::time::sleep(Duration::from_millis(30)).await;
    let kinds = rec.kinds.lock().clone();
    assert_eq!(kinds.first(), Some(&EventKind::QueueStarted));
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::ItemQueued).count(),
        2
    );
    assert!(kinds.contains(&EventKind::ItemCompleted));
    assert!(kinds.contains(&EventKind::ItemFailed));
}

#[tokio::test]
async fn cancelable_body_stops_its_repeat_loop() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();

    let handle = with_cancellation(Task::from_fn(move |cancel: CancelContext| {
        let counter = counter.clone();
        async move {
            let step = Task::from_fn(move |ctx: RepeatContext<()>| {
                let cancel = cancel.clone();
                let counter = counter.clone();
                async move {
                    cancel.check()?;
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    Ok(ctx.index())
                }
            });
            do_repeat(10_000, step).await.map_err(|e| e.source)
        }
    }));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(handle.cancel_with("enough"));
    assert!(handle.await.unwrap_err().is_canceled());

    tokio::time::sleep(Duration::from_millis(20)).await;
    let settled = ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), settled, "loop exited after cancel");
    assert!(settled < 10_000);
}
