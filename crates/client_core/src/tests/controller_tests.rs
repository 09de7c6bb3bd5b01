use super::*;
use serde_json::json;
use shared::domain::ColorChannel;

use crate::{error::COLORIZE_FALLBACK_MESSAGE, selection::ChannelFile};

fn full_selection() -> ChannelSelection {
    let mut selection = ChannelSelection::new();
    for channel in ColorChannel::ALL {
        let name = format!("{channel}.fits");
        selection.set(channel, ChannelFile::new(name.clone(), name.into_bytes()));
    }
    selection
}

fn response(image: &str, metadata: serde_json::Value) -> ColorizeResponse {
    serde_json::from_value(json!({ "imageData": image, "metadata": metadata }))
        .expect("response")
}

#[test]
fn starts_idle_without_result_or_error() {
    let controller = SubmissionController::new();
    assert_eq!(controller.state(), SubmissionState::Idle);
    assert!(controller.result().is_none());
    assert!(controller.error_message().is_none());
}

#[test]
fn incomplete_selection_is_rejected_without_leaving_current_state() {
    let mut controller = SubmissionController::new();
    let mut selection = full_selection();
    selection.clear(ColorChannel::Blue);

    let err = controller
        .begin(&selection, Palette::Natural)
        .expect_err("must reject");

    assert_eq!(err, SubmitError::MissingChannels(vec![ColorChannel::Blue]));
    assert_eq!(controller.state(), SubmissionState::Idle);
    assert_eq!(
        controller.error_message(),
        Some("Please select a file for each color channel.")
    );
}

#[test]
fn incomplete_selection_after_success_keeps_succeeded_result() {
    let mut controller = SubmissionController::new();
    let pending = controller
        .begin(&full_selection(), Palette::Natural)
        .expect("begin");
    let _ = controller.on_success(pending.attempt, response("img1.png", json!({"a": 1})));

    let err = controller
        .begin(&ChannelSelection::new(), Palette::Natural)
        .expect_err("must reject");

    assert!(matches!(err, SubmitError::MissingChannels(ref m) if m.len() == 3));
    assert_eq!(controller.state(), SubmissionState::Succeeded);
    assert!(controller.result().is_some());
}

#[test]
fn accepted_submit_moves_in_flight_and_snapshots_request() {
    let mut controller = SubmissionController::new();
    let pending = controller
        .begin(&full_selection(), Palette::Hubble)
        .expect("begin");

    assert_eq!(controller.state(), SubmissionState::InFlight);
    assert_eq!(pending.request.palette, Palette::Hubble);
    assert_eq!(pending.request.channels.green.filename(), "green.fits");
    assert_eq!(
        pending.request.input_summary(),
        "red.fits, green.fits, blue.fits"
    );
}

#[test]
fn second_submit_while_in_flight_is_rejected() {
    let mut controller = SubmissionController::new();
    let first = controller
        .begin(&full_selection(), Palette::Natural)
        .expect("begin");

    let err = controller
        .begin(&full_selection(), Palette::Natural)
        .expect_err("guard");
    assert_eq!(err, SubmitError::AlreadyInFlight);
    assert_eq!(controller.state(), SubmissionState::InFlight);

    let completion = controller
        .on_success(first.attempt, response("img1.png", json!({})))
        .expect("first attempt still completes");
    assert_eq!(completion.attempt, first.attempt);
}

#[test]
fn success_stores_result_and_yields_completion() {
    let mut controller = SubmissionController::new();
    let pending = controller
        .begin(&full_selection(), Palette::Natural)
        .expect("begin");

    let completion = controller
        .on_success(pending.attempt, response("img1.png", json!({"a": 1})))
        .expect("completion");

    assert_eq!(completion.outcome, Outcome::Succeeded);
    assert_eq!(controller.state(), SubmissionState::Succeeded);
    let result = controller.result().expect("result");
    assert_eq!(result.image.as_str(), "img1.png");
    assert_eq!(result.metadata.get("a"), Some(&json!(1)));
    assert!(controller.error_message().is_none());
}

#[test]
fn failure_uses_service_message_or_fallback() {
    let mut controller = SubmissionController::new();
    let pending = controller
        .begin(&full_selection(), Palette::Natural)
        .expect("begin");
    let completion = controller
        .on_failure(
            pending.attempt,
            &ColorizeError::Service {
                status: 500,
                message: Some("bad format".to_string()),
            },
        )
        .expect("completion");
    assert_eq!(completion.outcome, Outcome::Failed);
    assert_eq!(controller.state(), SubmissionState::Failed);
    assert_eq!(controller.error_message(), Some("bad format"));
    assert!(controller.result().is_none());

    let pending = controller
        .begin(&full_selection(), Palette::Natural)
        .expect("retry from failed");
    assert!(controller.error_message().is_none());
    let _ = controller.on_failure(
        pending.attempt,
        &ColorizeError::Transport("connection refused".to_string()),
    );
    assert_eq!(controller.error_message(), Some(COLORIZE_FALLBACK_MESSAGE));
}

#[test]
fn new_attempt_clears_previous_result_until_it_concludes() {
    let mut controller = SubmissionController::new();
    let first = controller
        .begin(&full_selection(), Palette::Natural)
        .expect("begin");
    let _ = controller.on_success(first.attempt, response("img1.png", json!({"a": 1})));

    let second = controller
        .begin(&full_selection(), Palette::Custom)
        .expect("begin");
    assert!(controller.result().is_none());

    let _ = controller.on_success(second.attempt, response("img2.png", json!({"b": 2})));
    let result = controller.result().expect("result");
    assert_eq!(result.image.as_str(), "img2.png");
    assert!(result.metadata.get("a").is_none());
    assert_eq!(result.metadata.len(), 1);
}

#[test]
fn stale_or_duplicate_outcomes_are_ignored() {
    let mut controller = SubmissionController::new();
    let first = controller
        .begin(&full_selection(), Palette::Natural)
        .expect("begin");
    let _ = controller.on_success(first.attempt, response("img1.png", json!({})));

    assert!(controller
        .on_success(first.attempt, response("dup.png", json!({})))
        .is_none());
    assert!(controller
        .on_failure(first.attempt, &ColorizeError::Transport("late".to_string()))
        .is_none());
    assert_eq!(controller.state(), SubmissionState::Succeeded);
    assert_eq!(
        controller.result().map(|r| r.image.as_str()),
        Some("img1.png")
    );

    let second = controller
        .begin(&full_selection(), Palette::Natural)
        .expect("begin");
    assert!(controller
        .on_success(first.attempt, response("stale.png", json!({})))
        .is_none());
    assert_eq!(controller.state(), SubmissionState::InFlight);
    assert!(second.attempt > first.attempt);
}

#[test]
fn outcome_without_submit_is_ignored() {
    let mut controller = SubmissionController::new();
    assert!(controller
        .complete(AttemptId(1), Ok(response("img.png", json!({}))))
        .is_none());
    assert_eq!(controller.state(), SubmissionState::Idle);
}
