//! Lifecycle workflows against the in-memory compute provider.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::json;
use vmlc::application::ports::SessionOutcome;
use vmlc::application::services::instance::{
    CreateOptions, CreateOutcome, DestroyOutcome, StartOutcome, StopOptions, create_instance,
    destroy_instance, list_zone_instances, start_instance, stop_instance,
};
use vmlc::application::services::operation::OperationWaiter;
use vmlc::domain::{Interrupted, WorkflowError};

use crate::helpers::{
    FakeCompute, FakeConfirm, FakeInterrupt, RecordingProgress, RecordingReporter, ZONE,
    fast_settings, image, instance, profile,
};

const FAMILY: &str = "dev-vm-image";

// ── create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_inserts_public_image_instance() {
    let compute = FakeCompute::new();
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());
    let confirm = FakeConfirm::no();

    let outcome = create_instance(
        &compute,
        &waiter,
        &confirm,
        &RecordingReporter::default(),
        &profile(),
        CreateOptions {
            zone: ZONE,
            ..CreateOptions::default()
        },
    )
    .await
    .expect("create");

    assert_eq!(
        outcome,
        CreateOutcome::Created {
            instance: "dev-vm".to_string(),
            zone: ZONE.to_string()
        }
    );
    assert_eq!(
        compute.calls(),
        [format!(
            "insert dev-vm {ZONE} projects/ubuntu-os-cloud/global/images/family/ubuntu-2204-lts"
        )]
    );
    assert!(confirm.prompts().is_empty(), "no images, no prompt");
    assert_eq!(progress.outcomes(), [SessionOutcome::Succeeded]);
}

#[tokio::test]
async fn test_create_refuses_existing_instance() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "RUNNING", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let err = create_instance(
        &compute,
        &waiter,
        &FakeConfirm::yes(),
        &RecordingReporter::default(),
        &profile(),
        CreateOptions {
            zone: ZONE,
            ..CreateOptions::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<WorkflowError>(),
        Some(WorkflowError::InstanceExists { .. })
    ));
    assert!(compute.calls().is_empty());
}

#[tokio::test]
async fn test_create_with_existing_images_aborts_when_declined() {
    let compute = FakeCompute::new().with_image(image("dev-vm-image-20250101000000", FAMILY));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());
    let confirm = FakeConfirm::no();

    let outcome = create_instance(
        &compute,
        &waiter,
        &confirm,
        &RecordingReporter::default(),
        &profile(),
        CreateOptions {
            zone: ZONE,
            ..CreateOptions::default()
        },
    )
    .await
    .expect("create");

    assert_eq!(outcome, CreateOutcome::Aborted);
    assert_eq!(confirm.prompts().len(), 1);
    assert!(confirm.prompts()[0].contains("1 image exist"));
    assert!(compute.calls().is_empty());
}

#[tokio::test]
async fn test_create_custom_image_and_startup_script() {
    let compute = FakeCompute::new();
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    create_instance(
        &compute,
        &waiter,
        &FakeConfirm::yes(),
        &RecordingReporter::default(),
        &profile(),
        CreateOptions {
            zone: "us-central1-a",
            image: Some("golden"),
            startup_script: Some("useradd {instance_user}"),
        },
    )
    .await
    .expect("create");

    assert_eq!(
        compute.calls(),
        ["insert dev-vm us-central1-a projects/test-project/global/images/golden"]
    );
}

#[tokio::test]
async fn test_create_operation_failure_names_step() {
    let compute = FakeCompute::new()
        .fail_operation("insert", json!({"errors": [{"message": "Quota exceeded"}]}));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let err = create_instance(
        &compute,
        &waiter,
        &FakeConfirm::yes(),
        &RecordingReporter::default(),
        &profile(),
        CreateOptions {
            zone: ZONE,
            ..CreateOptions::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Failed to create instance: Quota exceeded");
    assert_eq!(progress.outcomes(), [SessionOutcome::Failed]);
}

// ── start ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_running_instance_is_a_noop() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "RUNNING", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let outcome = start_instance(&compute, &waiter, &RecordingReporter::default(), &profile(), ZONE)
        .await
        .expect("start");

    assert_eq!(outcome, StartOutcome::AlreadyRunning);
    assert!(!outcome.changed());
    assert!(compute.calls().is_empty());
    assert!(progress.outcomes().is_empty());
}

#[tokio::test]
async fn test_start_terminated_instance() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "TERMINATED", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let outcome = start_instance(&compute, &waiter, &RecordingReporter::default(), &profile(), ZONE)
        .await
        .expect("start");

    assert_eq!(outcome, StartOutcome::Started);
    assert_eq!(compute.calls(), [format!("start dev-vm {ZONE}")]);
    assert_eq!(compute.instance_status("dev-vm").as_deref(), Some("RUNNING"));
}

#[tokio::test]
async fn test_start_missing_instance_restores_latest_image() {
    let compute = FakeCompute::new()
        .with_image(image("dev-vm-image-20250101000000", FAMILY))
        .with_image(image("dev-vm-image-20250301000000", FAMILY));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());
    let reporter = RecordingReporter::default();

    let outcome = start_instance(&compute, &waiter, &reporter, &profile(), ZONE)
        .await
        .expect("start");

    assert_eq!(
        outcome,
        StartOutcome::CreatedFromImage {
            image: "dev-vm-image-20250301000000".to_string()
        }
    );
    assert_eq!(
        compute.calls(),
        [format!(
            "insert dev-vm {ZONE} projects/test-project/global/images/dev-vm-image-20250301000000"
        )]
    );
    assert!(reporter.messages()[0].contains("restoring from image"));
}

#[tokio::test]
async fn test_start_missing_instance_without_image_fails() {
    let compute = FakeCompute::new();
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let err = start_instance(&compute, &waiter, &RecordingReporter::default(), &profile(), ZONE)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<WorkflowError>(),
        Some(WorkflowError::NoImage { .. })
    ));
}

#[tokio::test]
async fn test_start_transitional_status_is_rejected() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "STOPPING", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let err = start_instance(&compute, &waiter, &RecordingReporter::default(), &profile(), ZONE)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("STOPPING"));
    assert!(compute.calls().is_empty());
}

// ── stop ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stop_images_prunes_and_deletes_in_order() {
    let compute = FakeCompute::new()
        .with_instance(instance("dev-vm", "RUNNING", ZONE))
        .with_image(image("dev-vm-image-20250101000000", FAMILY));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let report = stop_instance(
        &compute,
        &waiter,
        &RecordingReporter::default(),
        &profile(),
        ZONE,
        StopOptions::default(),
    )
    .await
    .expect("stop");

    let calls = compute.calls();
    assert_eq!(calls.len(), 4, "{calls:?}");
    assert_eq!(calls[0], format!("stop dev-vm {ZONE}"));
    assert!(calls[1].starts_with("create-image dev-vm-image-"));
    assert_eq!(calls[2], "delete-image dev-vm-image-20250101000000");
    assert_eq!(calls[3], format!("delete dev-vm {ZONE}"));

    let created = report.image.clone().expect("image");
    assert!(created.starts_with("dev-vm-image-"));
    assert_eq!(created.len(), "dev-vm-image-".len() + 14);
    assert!(report.stopped);
    assert!(report.instance_deleted);
    assert_eq!(report.deleted_images, ["dev-vm-image-20250101000000"]);
    assert_eq!(compute.image_names(), [created]);
    assert!(compute.instance_status("dev-vm").is_none());
    assert_eq!(progress.outcomes(), [SessionOutcome::Succeeded; 4]);
}

#[tokio::test]
async fn test_stop_keep_leaves_instance() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "RUNNING", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let report = stop_instance(
        &compute,
        &waiter,
        &RecordingReporter::default(),
        &profile(),
        ZONE,
        StopOptions {
            keep: true,
            basic: false,
        },
    )
    .await
    .expect("stop");

    assert!(report.image.is_some());
    assert!(!report.instance_deleted);
    assert_eq!(compute.instance_status("dev-vm").as_deref(), Some("TERMINATED"));
}

#[tokio::test]
async fn test_stop_basic_only_stops() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "RUNNING", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let report = stop_instance(
        &compute,
        &waiter,
        &RecordingReporter::default(),
        &profile(),
        ZONE,
        StopOptions {
            keep: false,
            basic: true,
        },
    )
    .await
    .expect("stop");

    assert_eq!(compute.calls(), [format!("stop dev-vm {ZONE}")]);
    assert!(report.image.is_none());
    assert!(!report.instance_deleted);
}

#[tokio::test]
async fn test_stop_already_stopped_skips_stop_call() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "TERMINATED", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let reporter = RecordingReporter::default();

    let report = stop_instance(
        &compute,
        &waiter,
        &reporter,
        &profile(),
        ZONE,
        StopOptions::default(),
    )
    .await
    .expect("stop");

    assert!(!report.stopped);
    assert!(compute.calls()[0].starts_with("create-image"));
    let notices: Vec<_> = reporter
        .messages()
        .into_iter()
        .filter(|m| m.contains("already stopped"))
        .collect();
    assert_eq!(notices, ["step: instance 'dev-vm' is already stopped"]);
}

#[tokio::test]
async fn test_stop_never_prunes_the_image_it_just_created() {
    let compute = FakeCompute::new()
        .with_instance(instance("dev-vm", "RUNNING", ZONE))
        .with_image(image("dev-vm-image-20240101000000", FAMILY))
        .with_image(image("dev-vm-image-20250101000000", FAMILY))
        .with_stale_latest("dev-vm-image-20250101000000");
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let report = stop_instance(
        &compute,
        &waiter,
        &RecordingReporter::default(),
        &profile(),
        ZONE,
        StopOptions {
            keep: true,
            basic: false,
        },
    )
    .await
    .expect("stop");

    let created = report.image.clone().expect("image");
    assert_eq!(report.deleted_images, ["dev-vm-image-20240101000000"]);
    let remaining = compute.image_names();
    assert!(remaining.contains(&created), "{remaining:?}");
    assert!(remaining.contains(&"dev-vm-image-20250101000000".to_string()));
}

#[tokio::test]
async fn test_stop_missing_instance_errors() {
    let compute = FakeCompute::new();
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let err = stop_instance(
        &compute,
        &waiter,
        &RecordingReporter::default(),
        &profile(),
        ZONE,
        StopOptions::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("No instance named 'dev-vm' found in zone '{ZONE}'")
    );
}

#[tokio::test]
async fn test_stop_failure_halts_workflow() {
    let compute = FakeCompute::new()
        .with_instance(instance("dev-vm", "RUNNING", ZONE))
        .fail_operation("stop", json!({"code": 400, "message": "bad request"}));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let err = stop_instance(
        &compute,
        &waiter,
        &RecordingReporter::default(),
        &profile(),
        ZONE,
        StopOptions::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Failed to stop instance: bad request");
    assert_eq!(compute.calls().len(), 1, "no step after the failed one");
}

#[tokio::test]
async fn test_stop_image_without_target_link_fails_step() {
    let compute = FakeCompute::new()
        .with_instance(instance("dev-vm", "TERMINATED", ZONE))
        .without_target_link();
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let err = stop_instance(
        &compute,
        &waiter,
        &RecordingReporter::default(),
        &profile(),
        ZONE,
        StopOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<WorkflowError>(),
        Some(WorkflowError::MissingTargetLink)
    ));
    assert_eq!(progress.outcomes(), [SessionOutcome::Succeeded]);
    assert!(compute.instance_status("dev-vm").is_some(), "instance kept");
}

#[tokio::test]
async fn test_stop_interrupt_propagates_and_stops_workflow() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "RUNNING", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Immediately, fast_settings());

    let err = stop_instance(
        &compute,
        &waiter,
        &RecordingReporter::default(),
        &profile(),
        ZONE,
        StopOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(err.downcast_ref::<Interrupted>().is_some());
    assert_eq!(compute.calls().len(), 1);
    assert_eq!(progress.outcomes(), [SessionOutcome::Cancelled]);
}

// ── destroy ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_destroy_missing_instance_is_not_found() {
    let compute = FakeCompute::new();
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());
    let confirm = FakeConfirm::yes();

    let outcome = destroy_instance(&compute, &waiter, &confirm, &profile(), ZONE)
        .await
        .expect("destroy");

    assert_eq!(outcome, DestroyOutcome::NotFound);
    assert!(confirm.prompts().is_empty());
}

#[tokio::test]
async fn test_destroy_declined_keeps_instance() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "RUNNING", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let outcome = destroy_instance(&compute, &waiter, &FakeConfirm::no(), &profile(), ZONE)
        .await
        .expect("destroy");

    assert_eq!(outcome, DestroyOutcome::Aborted);
    assert!(compute.calls().is_empty());
}

#[tokio::test]
async fn test_destroy_deletes_instance() {
    let compute = FakeCompute::new().with_instance(instance("dev-vm", "RUNNING", ZONE));
    let progress = RecordingProgress::default();
    let waiter = OperationWaiter::new(&progress, &FakeInterrupt::Never, fast_settings());

    let outcome = destroy_instance(&compute, &waiter, &FakeConfirm::yes(), &profile(), ZONE)
        .await
        .expect("destroy");

    assert_eq!(outcome, DestroyOutcome::Destroyed);
    assert_eq!(compute.calls(), [format!("delete dev-vm {ZONE}")]);
    assert_eq!(compute.queries(), 1);
}

// ── status ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_zone_instances_sorted_and_filtered() {
    let compute = FakeCompute::new()
        .with_instance(instance("web", "RUNNING", ZONE))
        .with_instance(instance("api", "TERMINATED", ZONE))
        .with_instance(instance("other", "RUNNING", "us-central1-a"));

    let instances = list_zone_instances(&compute, ZONE).await.expect("list");

    let names: Vec<&str> = instances.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["api", "web"]);
}
