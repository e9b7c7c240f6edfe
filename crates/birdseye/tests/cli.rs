use assert_cmd::Command;
use birdseye::io::{load_image, save_image};
use birdseye::{CameraPosition, Image};
use predicates::prelude::*;

const TRAPEZOID: &str = "20,10 44,10 60,45 4,45";

fn birdseye() -> Command {
    Command::cargo_bin("birdseye").expect("binary built")
}

#[test]
fn warp_writes_patch_of_requested_size() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("cam.png");
    let out = dir.path().join("top.png");
    save_image(&src, &Image::filled(64, 48, 3, 50)).expect("frame");

    birdseye()
        .args(["warp", "--image"])
        .arg(&src)
        .args(["--points", TRAPEZOID, "--width", "32", "--height", "24", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Top-down view saved"));

    let patch = load_image(&out).expect("patch");
    assert_eq!((patch.width, patch.height), (32, 24));
}

#[test]
fn warp_rejects_malformed_points() {
    birdseye()
        .args(["warp", "--image", "x.png", "--points", "1,2 3,4", "--out", "y.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 4 points"));
}

#[test]
fn warp_reports_missing_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    birdseye()
        .args(["warp", "--image"])
        .arg(dir.path().join("nope.png"))
        .args(["--points", TRAPEZOID, "--out"])
        .arg(dir.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load image"));
}

#[test]
fn compose_uses_config_relative_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    for pos in CameraPosition::ALL {
        save_image(
            dir.path().join(format!("{pos}.png")),
            &Image::filled(64, 48, 3, 0),
        )
        .expect("frame");
    }
    let cam = |name: &str| {
        format!(r#"{{ "image_path": "{name}.png", "points": [[20,10],[44,10],[60,45],[4,45]] }}"#)
    };
    let cfg = format!(
        r#"{{
            "patch_width": 40, "patch_height": 30,
            "layout": {{ "car_area_width": 20, "car_area_height": 24 }},
            "cameras": {{ "front": {}, "back": {}, "left": {}, "right": {} }}
        }}"#,
        cam("front"),
        cam("back"),
        cam("left"),
        cam("right")
    );
    let cfg_path = dir.path().join("rig.json");
    std::fs::write(&cfg_path, cfg).expect("config");
    let report = dir.path().join("report.json");

    birdseye()
        .args(["compose", "--config"])
        .arg(&cfg_path)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("100x84"));

    let canvas = load_image(dir.path().join("birds_eye_view.png")).expect("composite");
    assert_eq!((canvas.width, canvas.height), (100, 84));
    assert!(report.exists());
}

#[test]
fn pair_stacks_two_views() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    let out = dir.path().join("pair.png");
    save_image(&a, &Image::filled(64, 48, 3, 10)).expect("a");
    save_image(&b, &Image::filled(64, 48, 3, 20)).expect("b");

    birdseye()
        .args(["pair", "--left"])
        .arg(&a)
        .args(["--left-points", TRAPEZOID, "--right"])
        .arg(&b)
        .args(["--right-points", TRAPEZOID, "--width", "16", "--height", "8", "--out"])
        .arg(&out)
        .assert()
        .success();

    let canvas = load_image(&out).expect("pair");
    assert_eq!((canvas.width, canvas.height), (32, 8));
    assert_eq!(canvas.pixel(3, 3), &[10, 10, 10]);
    assert_eq!(canvas.pixel(20, 3), &[20, 20, 20]);
}

#[test]
fn pick_prints_quad_after_reset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let img = dir.path().join("cam.png");
    save_image(&img, &Image::new(100, 80, 3)).expect("frame");

    birdseye()
        .args(["pick", "--image"])
        .arg(&img)
        .write_stdin("5 5\n6 6\nr\n10 10\n90 12\n95 70\nbogus\n500 500\n3 75\n")
        .assert()
        .success()
        .stdout("[[10.0,10.0],[90.0,12.0],[95.0,70.0],[3.0,75.0]]\n")
        .stderr(predicate::str::contains("Points cleared"));
}

#[test]
fn pick_fails_on_short_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let img = dir.path().join("cam.png");
    save_image(&img, &Image::new(20, 20, 3)).expect("frame");

    birdseye()
        .args(["pick", "-i"])
        .arg(&img)
        .write_stdin("1 1\n2 2\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input ended after 2 of 4 points"));
}
