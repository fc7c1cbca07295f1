//! GmIdentifyProbe against stand-in identify programs
#![cfg(unix)]

use guard_probe::{GmIdentifyProbe, ImageFormat, ImageProbe, ProbeError};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn reads_report_from_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "identify",
        r#"cat <<'REPORT'
Image: $2
  Format: PNG (Portable Network Graphics)
  Geometry: 100x100
  Type: true color
REPORT"#,
    );

    let probe = GmIdentifyProbe::standalone(script.to_string_lossy());
    let meta = probe.identify(Path::new("flat.png")).await.unwrap();

    assert_eq!(meta.format, ImageFormat::Png);
    assert_eq!((meta.width, meta.height), (100, 100));
    assert!(meta.opacity.is_none());
    assert!(meta.is_fully_opaque());
}

#[tokio::test]
async fn passes_identify_subcommand() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "gm",
        r#"[ "$1" = "identify" ] && [ "$2" = "-verbose" ] || exit 3
printf 'Image: x\n  Format: JPEG\n  Geometry: 7x9\n'"#,
    );

    let probe = GmIdentifyProbe::new(script.to_string_lossy());
    let meta = probe.identify(Path::new("x.jpg")).await.unwrap();
    assert_eq!(meta.format, ImageFormat::Jpeg);
    assert_eq!((meta.width, meta.height), (7, 9));
}

#[tokio::test]
async fn nonzero_exit_is_rejection_with_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "identify",
        "echo 'Improper image header (broken.png)' >&2\nexit 1",
    );

    let probe = GmIdentifyProbe::standalone(script.to_string_lossy());
    let err = probe.identify(Path::new("broken.png")).await.unwrap_err();

    match &err {
        ProbeError::Rejected { stderr, .. } => assert!(stderr.contains("Improper image header")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn standalone_identify_alpha_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "identify",
        r#"cat <<'REPORT'
Image:
  Filename: logo.png
  Format: PNG (Portable Network Graphics)
  Geometry: 32x16+0+0
  Channel statistics:
    Pixels: 512
    Alpha:
      min: 0  (0)
      max: 255 (1)
REPORT"#,
    );

    let probe = GmIdentifyProbe::standalone(script.to_string_lossy());
    let meta = probe.identify(Path::new("logo.png")).await.unwrap();

    assert_eq!((meta.width, meta.height), (32, 16));
    assert!(meta.opacity.is_some());
    assert!(!meta.is_fully_opaque());
}
