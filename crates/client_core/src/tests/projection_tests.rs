use super::*;
use serde_json::json;

use std::time::{SystemTime, UNIX_EPOCH};

fn result_with(image: &str, entries: usize) -> ProcessingResult {
    let mut metadata = Metadata::new();
    for i in 0..entries {
        metadata.insert(format!("KEY{i:02}"), json!(i));
    }
    ProcessingResult {
        image: ImageRef::new(image),
        metadata,
    }
}

fn temp_dir(tag: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!("colorizer_{tag}_{suffix}"))
}

#[test]
fn preview_caps_at_fifteen_entries_in_received_order() {
    let result = result_with("img.png", 40);
    let preview = MetadataPreview::from_metadata(&result.metadata);

    assert_eq!(preview.entries.len(), METADATA_PREVIEW_LEN);
    assert_eq!(preview.entries[0].0, "KEY00");
    assert_eq!(preview.entries[14].0, "KEY14");
    assert_eq!(preview.total, 40);
    assert!(preview.truncated());
}

#[test]
fn preview_shows_everything_up_to_the_limit() {
    for size in [0, 1, 15] {
        let result = result_with("img.png", size);
        let preview = MetadataPreview::from_metadata(&result.metadata);
        assert_eq!(preview.entries.len(), size);
        assert!(!preview.truncated());
    }
}

#[test]
fn preview_renders_strings_raw_and_other_values_as_json() {
    let mut metadata = Metadata::new();
    metadata.insert("OBJECT".to_string(), json!("M42"));
    metadata.insert("EXPTIME".to_string(), json!(300.5));
    metadata.insert("FLIP".to_string(), json!(false));

    let preview = MetadataPreview::from_metadata(&metadata);
    assert_eq!(
        preview.entries,
        vec![
            ("OBJECT".to_string(), "M42".to_string()),
            ("EXPTIME".to_string(), "300.5".to_string()),
            ("FLIP".to_string(), "false".to_string()),
        ]
    );
}

#[test]
fn image_hidden_while_in_flight() {
    let result = result_with("img1.png", 1);

    let loading = ResultView::project(SubmissionState::InFlight, Some(&result));
    assert_eq!(loading.pane, ImagePane::Loading);

    let shown = ResultView::project(SubmissionState::Succeeded, Some(&result));
    assert_eq!(shown.pane, ImagePane::Image(&result.image));
    assert!(shown.can_export);

    let empty = ResultView::project(SubmissionState::Failed, None);
    assert_eq!(empty.pane, ImagePane::Placeholder);
    assert!(empty.metadata.is_none());
    assert!(!empty.can_export);
}

#[test]
fn filename_is_last_path_segment_or_fallback() {
    let cases = [
        ("http://127.0.0.1:5000/static/m42_rgb.png", "m42_rgb.png"),
        ("http://host/static/out.png?v=2#top", "out.png"),
        ("renders/ngc7000.png", "ngc7000.png"),
        ("img1.png", "img1.png"),
        ("http://host/static/", FALLBACK_EXPORT_NAME),
        ("data:image/png;base64,iVBORw0KGgo=", FALLBACK_EXPORT_NAME),
        ("", FALLBACK_EXPORT_NAME),
    ];
    for (raw, expected) in cases {
        assert_eq!(derive_filename(&ImageRef::new(raw)), expected, "input {raw:?}");
    }
}

#[tokio::test]
async fn export_decodes_data_url_into_fallback_name() {
    let dir = temp_dir("export_data");
    let payload = b"\x89PNG\r\n\x1a\nfake";
    let image = ImageRef::new(format!("data:image/png;base64,{}", STANDARD.encode(payload)));

    let written = export_image(&image, &dir).await.expect("export");

    assert_eq!(written, dir.join(FALLBACK_EXPORT_NAME));
    assert_eq!(std::fs::read(&written).expect("read back"), payload);
    std::fs::remove_dir_all(dir).expect("cleanup");
}

#[tokio::test]
async fn export_copies_local_path_under_its_own_name() {
    let source_dir = temp_dir("export_src");
    std::fs::create_dir_all(&source_dir).expect("source dir");
    let source = source_dir.join("m31.png");
    std::fs::write(&source, b"pixels").expect("write source");
    let out_dir = temp_dir("export_out");

    let image = ImageRef::new(source.to_string_lossy().into_owned());
    let written = export_image(&image, &out_dir).await.expect("export");

    assert_eq!(written, out_dir.join("m31.png"));
    assert_eq!(std::fs::read(&written).expect("read back"), b"pixels");
    std::fs::remove_dir_all(source_dir).expect("cleanup");
    std::fs::remove_dir_all(out_dir).expect("cleanup");
}

#[tokio::test]
async fn export_refuses_remote_reference() {
    let dir = temp_dir("export_remote");
    let err = export_image(&ImageRef::new("https://example.org/static/a.png"), &dir)
        .await
        .expect_err("remote");
    assert!(matches!(err, ExportError::RemoteReference(_)));
    assert!(!dir.exists());
}

#[tokio::test]
async fn export_rejects_non_base64_data_url() {
    let dir = temp_dir("export_plain");
    let err = export_image(&ImageRef::new("data:text/plain,hello"), &dir)
        .await
        .expect_err("plain data url");
    assert!(matches!(err, ExportError::MalformedDataUrl(_)));
}
