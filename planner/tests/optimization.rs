mod context;

use context::*;
use entities::{BucketId, DispatchError, TaskRole};
use planner::MoveRequest;
use std::sync::Arc;

fn route() -> Vec<entities::Order> {
    vec![
        order("origin", Some(A), 0),
        order("w1", Some(A), 1),
        order("w2", Some(A), 2),
        order("dest", Some(A), 3),
    ]
}

#[tokio::test]
async fn waypoints_are_written_in_the_optimizer_order() {
    let optimizer = Arc::new(StubOptimizer::returning(vec![1, 0]));
    let ctx = TestContext::new(route(), optimizer.clone());

    let board = ctx.board().await;
    ctx.engine
        .optimize_bucket(&ctx.session, &board, &bucket_a())
        .await
        .unwrap();

    let board = ctx.board().await;
    assert_eq!(
        positions(&board, &bucket_a()),
        vec![
            ("origin".to_string(), 0),
            ("w2".to_string(), 1),
            ("w1".to_string(), 2),
            ("dest".to_string(), 3),
        ]
    );
    assert_eq!(optimizer.calls(), 1);
    assert!(!ctx.session.is_optimizing(&bucket_a()));
}

#[tokio::test]
async fn a_failing_optimizer_leaves_the_route_alone() {
    let ctx = TestContext::new(route(), Arc::new(StubOptimizer::failing()));
    let before = ctx.store.documents();

    let board = ctx.board().await;
    let err = ctx
        .engine
        .optimize_bucket(&ctx.session, &board, &bucket_a())
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::OptimizationUnavailable { .. }));
    assert_eq!(ctx.store.documents(), before);
    assert_eq!(ctx.store.commit_count(), 0);
    assert!(!ctx.session.is_optimizing(&bucket_a()));
}

#[tokio::test]
async fn a_malformed_answer_is_discarded() {
    let ctx = TestContext::new(route(), Arc::new(StubOptimizer::returning(vec![0, 0])));

    let board = ctx.board().await;
    let err = ctx
        .engine
        .optimize_bucket(&ctx.session, &board, &bucket_a())
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::OptimizationUnavailable { .. }));
    assert_eq!(ctx.store.commit_count(), 0);
}

#[tokio::test]
async fn optimizing_restores_a_scrambled_route() {
    let ctx = TestContext::new(route(), Arc::new(OriginalOrderOptimizer));
    let original = ids(&ctx.board().await, &bucket_a());

    let board = ctx.board().await;
    ctx.engine
        .move_task(
            &board,
            &MoveRequest::new("w1", TaskRole::Pickup, bucket_a(), 1, bucket_a(), 2),
        )
        .await
        .unwrap();
    let board = ctx.board().await;
    assert_eq!(ids(&board, &bucket_a()), vec!["origin", "w2", "w1", "dest"]);

    ctx.engine
        .optimize_bucket(&ctx.session, &board, &bucket_a())
        .await
        .unwrap();

    let board = ctx.board().await;
    assert_eq!(ids(&board, &bucket_a()), original);
    assert!(board.contiguity_violations().is_empty());
}

#[tokio::test]
async fn identity_answer_keeps_the_route() {
    let ctx = TestContext::new(route(), Arc::new(StubOptimizer::returning(vec![0, 1])));
    let before = positions(&ctx.board().await, &bucket_a());

    let board = ctx.board().await;
    ctx.engine
        .optimize_bucket(&ctx.session, &board, &bucket_a())
        .await
        .unwrap();

    assert_eq!(positions(&ctx.board().await, &bucket_a()), before);
}

#[tokio::test]
async fn a_second_request_for_the_same_bucket_is_refused() {
    let optimizer = Arc::new(GatedOptimizer::default());
    let ctx = TestContext::new(route(), optimizer.clone());
    let board = ctx.board().await;

    let first_bucket = bucket_a();
    let first = ctx.engine.optimize_bucket(&ctx.session, &board, &first_bucket);
    let second = async {
        optimizer.entered.notified().await;
        let refused = ctx
            .engine
            .optimize_bucket(&ctx.session, &board, &bucket_a())
            .await;
        optimizer.release.notify_one();
        refused
    };

    let (first, second) = tokio::join!(first, second);

    first.unwrap();
    assert!(matches!(
        second,
        Err(DispatchError::OptimizationInProgress { .. })
    ));
    assert!(!ctx.session.is_optimizing(&bucket_a()));
}

#[tokio::test]
async fn short_or_ungeocoded_routes_are_not_sent() {
    let optimizer = Arc::new(StubOptimizer::returning(vec![]));
    let mut orders = vec![order("only", Some(A), 0), order("b1", Some(B), 0), order("b2", Some(B), 1)];
    orders[2].pickup_task.geo = None;
    let ctx = TestContext::new(orders, optimizer.clone());
    let board = ctx.board().await;

    for bucket in [bucket_a(), bucket_b()] {
        let err = ctx
            .engine
            .optimize_bucket(&ctx.session, &board, &bucket)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidInput { .. }), "{err}");
    }

    let err = ctx
        .engine
        .optimize_bucket(&ctx.session, &board, &BucketId::fixed("nowhere"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::NotFound { .. }));

    assert_eq!(optimizer.calls(), 0);
}

#[tokio::test]
async fn two_task_routes_need_no_waypoints() {
    let optimizer = Arc::new(StubOptimizer::returning(vec![]));
    let ctx = TestContext::new(
        vec![order("b1", Some(B), 3), order("b2", Some(B), 7)],
        optimizer.clone(),
    );

    let board = ctx.board().await;
    ctx.engine
        .optimize_bucket(&ctx.session, &board, &bucket_b())
        .await
        .unwrap();

    assert_eq!(
        positions(&ctx.board().await, &bucket_b()),
        vec![("b1".to_string(), 0), ("b2".to_string(), 1)]
    );
    assert_eq!(optimizer.calls(), 1);
}

#[tokio::test]
async fn optimizing_repairs_gapped_positions() {
    let ctx = TestContext::new(
        vec![
            order("origin", Some(A), 2),
            order("w1", Some(A), 5),
            order("w2", Some(A), 5),
            order("dest", Some(A), 11),
        ],
        Arc::new(StubOptimizer::returning(vec![1, 0])),
    );
    let board = ctx.board().await;
    assert_eq!(board.contiguity_violations(), vec![&bucket_a()]);

    ctx.engine
        .optimize_bucket(&ctx.session, &board, &bucket_a())
        .await
        .unwrap();

    let board = ctx.board().await;
    assert_eq!(
        positions(&board, &bucket_a()),
        vec![
            ("origin".to_string(), 0),
            ("w2".to_string(), 1),
            ("w1".to_string(), 2),
            ("dest".to_string(), 3),
        ]
    );
    assert!(board.contiguity_violations().is_empty());
}
