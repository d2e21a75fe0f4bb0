//! Scheduler behaviour: periodic cycles, failure reporting and shutdown.

use std::sync::Arc;
use std::time::Duration;

use sqs_exporter_monitor::{
    Error, LabelCollisionPolicy, MonitoringCycle, MonitoringCycleOptions, MonitoringErrorKind,
    QueueMetrics, Scheduler, SchedulerOptions,
};
use sqs_exporter_queues_mock::MockQueueService;
use tokio::sync::mpsc;
use tokio::time::timeout;

const ORDERS: &str = "http://localhost:4566/000000000000/orders";

fn scheduler(service: &MockQueueService, options: SchedulerOptions) -> Scheduler<MockQueueService> {
    let cycle = MonitoringCycle::new(MonitoringCycleOptions {
        service: Arc::new(service.clone()),
        queue_name_prefix: None,
        fetch_tags: false,
        collision_policy: LabelCollisionPolicy::Overwrite,
        metrics: QueueMetrics::new().unwrap(),
    });

    Scheduler::new(cycle, options)
}

async fn wait_for_list_calls(service: &MockQueueService, calls: usize) {
    timeout(Duration::from_secs(5), async {
        while service.list_calls() < calls {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("scheduler did not run enough cycles");
}

#[tokio::test]
async fn test_first_cycle_runs_immediately() {
    let service = MockQueueService::new();
    service.add_queue(ORDERS);

    let scheduler = scheduler(
        &service,
        SchedulerOptions {
            period: Duration::from_secs(3600),
            cycle_timeout: Duration::from_secs(5),
        },
    );

    let (tx, _rx) = mpsc::channel(1);
    scheduler.start(tx).unwrap();

    wait_for_list_calls(&service, 1).await;
    scheduler.shutdown().await;

    assert_eq!(service.list_calls(), 1);
}

#[tokio::test]
async fn test_failures_are_reported_every_cycle() {
    let service = MockQueueService::new();
    service.fail_listing(true);

    let scheduler = scheduler(
        &service,
        SchedulerOptions {
            period: Duration::from_millis(10),
            cycle_timeout: Duration::from_secs(5),
        },
    );

    let (tx, mut rx) = mpsc::channel(8);
    scheduler.start(tx).unwrap();

    for _ in 0..3 {
        let failure = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(failure.kind(), MonitoringErrorKind::Discovery);
    }

    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_slow_cycle_times_out() {
    let service = MockQueueService::new();
    service.add_queue(ORDERS);
    service.set_latency(Duration::from_millis(200));

    let scheduler = scheduler(
        &service,
        SchedulerOptions {
            period: Duration::from_secs(3600),
            cycle_timeout: Duration::from_millis(20),
        },
    );

    let (tx, mut rx) = mpsc::channel(1);
    scheduler.start(tx).unwrap();

    let failure = timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(failure.kind(), MonitoringErrorKind::Timeout);

    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_cycles() {
    let service = MockQueueService::new();
    service.add_queue(ORDERS);

    let scheduler = scheduler(
        &service,
        SchedulerOptions {
            period: Duration::from_millis(10),
            cycle_timeout: Duration::from_secs(5),
        },
    );

    let (tx, _rx) = mpsc::channel(1);
    let handle = scheduler.start(tx).unwrap();

    wait_for_list_calls(&service, 2).await;
    scheduler.shutdown().await;
    handle.await.unwrap();

    let calls = service.list_calls();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(service.list_calls(), calls);
}

#[tokio::test]
async fn test_scheduler_starts_once() {
    let service = MockQueueService::new();
    service.add_queue(ORDERS);

    let scheduler = scheduler(&service, SchedulerOptions::default());

    let (tx, _rx) = mpsc::channel(1);
    scheduler.start(tx.clone()).unwrap();

    assert!(matches!(scheduler.start(tx), Err(Error::AlreadyStarted)));

    scheduler.shutdown().await;
}
