use cd_curves::RowTag;
use cd_session::{
    Acquired, CancelReason, DialogInput, EventQueue, FixedExportPath, Interaction, NumericDialog,
    ReplayScript, ScriptEvent, ScriptedHost, Session, SessionConfig, SessionContext,
    SessionOutcome, StepPrompt, TOP_STEPS, TextChannelInput, TraceColor, read_rows,
    run_calibration,
};
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("cd-session-{tag}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn click(x: f64, y: f64) -> String {
    format!("  - {{ kind: click, x: {x}, y: {y} }}\n")
}

fn key(name: &str) -> String {
    format!("  - {{ kind: key, key: {name} }}\n")
}

/// Eight calibration clicks: top x 300/600, top y 700/100, bottom x 300/600, bottom y 1500/900.
fn calibration_clicks() -> String {
    [
        click(300.0, 0.0),
        click(600.0, 0.0),
        click(0.0, 700.0),
        click(0.0, 100.0),
        click(300.0, 0.0),
        click(600.0, 0.0),
        click(0.0, 1500.0),
        click(0.0, 900.0),
    ]
    .concat()
}

const CALIBRATION_VALUES: &str = "[3000, 6000, 2, 11, 3000, 6000, 250, 550]";

fn pressure_curve() -> String {
    [
        click(350.0, 300.0),
        click(420.0, 350.0),
        click(500.0, 420.0),
        click(578.0, 500.0),
        key("enter"),
    ]
    .concat()
}

fn power_curve() -> String {
    [
        click(340.0, 1300.0),
        click(450.0, 1200.0),
        click(530.0, 1100.0),
        click(600.0, 1000.0),
        key("enter"),
    ]
    .concat()
}

fn script(igvs: &str, values: &str, events: &str) -> ReplayScript {
    let yaml = format!(
        "config:\n  igvs: \"{igvs}\"\n  num_points: 7\nvalues: {values}\nevents:\n{events}"
    );
    ReplayScript::from_yaml_str(&yaml).expect("valid script")
}

#[test]
fn full_session_exports_aligned_rows() {
    let dir = temp_dir("full");
    let out = dir.join("curves.csv");
    let events = [calibration_clicks(), pressure_curve(), power_curve()].concat();
    let (mut session, advisories) = script("0", CALIBRATION_VALUES, &events).into_session(Some(out.clone()));
    assert!(advisories.is_empty());

    let report = session.run().expect("session completes");
    assert_eq!(report.rows.len(), 7);
    assert!(report.skipped.is_empty());
    assert_eq!(
        report.outcome,
        SessionOutcome::Exported {
            path: out.clone(),
            rows: 7
        }
    );

    // Grid runs from 5780 down to 3500; 5780 snaps to the design flow.
    let flows: Vec<i64> = report.rows.iter().map(|r| r.flow).collect();
    assert_eq!(flows, vec![5776, 5400, 5020, 4640, 4260, 3880, 3500]);
    let tagged: Vec<_> = report.rows.iter().filter(|r| r.comment.is_some()).collect();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].comment, Some(RowTag::DesignPoint));

    let read_back = read_rows(&out).expect("read exported csv");
    assert_eq!(read_back, report.rows);

    let host = session.host();
    assert_eq!(host.traces().len(), 2);
    assert!(host.traces().iter().all(|t| t.color == TraceColor::Red));
    assert_eq!(session.context().stage(), "done");
    assert!(host.overlays().last().unwrap().starts_with("Step 13:\nDone."));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn quit_key_during_curve_picking_writes_nothing() {
    let dir = temp_dir("quit");
    let out = dir.join("curves.csv");
    let events = [
        calibration_clicks(),
        click(350.0, 300.0),
        click(420.0, 350.0),
        key("q"),
    ]
    .concat();
    let (mut session, _) = script("0", CALIBRATION_VALUES, &events).into_session(Some(out.clone()));

    let err = session.run().unwrap_err();
    assert_eq!(err.cancel_reason(), Some(&CancelReason::KeyboardQuit));
    assert_eq!(session.context().stage(), "igv_0_top_points");
    assert!(!out.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn closing_the_window_cancels_calibration() {
    let dir = temp_dir("close");
    let out = dir.join("curves.csv");
    let events = [click(300.0, 0.0), "  - { kind: close }\n".to_string()].concat();
    let (mut session, _) = script("0", CALIBRATION_VALUES, &events).into_session(Some(out.clone()));

    let err = session.run().unwrap_err();
    assert_eq!(err.cancel_reason(), Some(&CancelReason::WindowClosed));
    assert_eq!(session.context().stage(), "calibrate_top_x2");
    assert!(!out.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn non_overlapping_curves_skip_the_igv() {
    let dir = temp_dir("overlap");
    let out = dir.join("curves.csv");
    let events = [
        calibration_clicks(),
        click(300.0, 300.0),
        click(350.0, 350.0),
        key("enter"),
        click(500.0, 1300.0),
        click(600.0, 1200.0),
        key("enter"),
    ]
    .concat();
    let (mut session, _) = script("0", CALIBRATION_VALUES, &events).into_session(Some(out.clone()));

    let report = session.run().expect("no error escapes");
    assert!(report.rows.is_empty());
    assert_eq!(report.skipped, vec![0.0]);
    assert!(read_rows(&out).expect("header-only csv").is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_curve_skips_and_colors_follow_igv_index() {
    let events = [
        calibration_clicks(),
        key("enter"),
        pressure_curve(),
        power_curve(),
    ]
    .concat();
    let (mut session, _) = script("0, 20", CALIBRATION_VALUES, &events).into_session(None);

    let report = session.run().expect("session completes");
    assert_eq!(report.skipped, vec![0.0]);
    assert_eq!(report.rows.len(), 7);
    assert!(report.rows.iter().all(|r| r.igv == 20.0 && r.comment.is_none()));
    assert_eq!(report.outcome, SessionOutcome::NotExported { rows: 7 });
    assert!(session.host().traces().iter().all(|t| t.color == TraceColor::Blue));
}

#[test]
fn invalid_numeric_answer_is_asked_again() {
    let values = "[\"abc\", 3000, 6000, 2, 11, 3000, 6000, 250, 550]";
    let events = [calibration_clicks(), pressure_curve(), power_curve()].concat();
    let (mut session, _) = script("0", values, &events).into_session(None);
    let report = session.run().expect("session completes");
    assert_eq!(report.rows.len(), 7);
}

#[test]
fn back_removes_last_point_then_back_at_zero_restarts() {
    let host = ScriptedHost::new([
        ScriptEvent::Click {
            x: 1.0,
            y: 1.0,
            outside: false,
            button: Default::default(),
        },
        ScriptEvent::Click {
            x: 2.0,
            y: 2.0,
            outside: false,
            button: Default::default(),
        },
        ScriptEvent::Click {
            x: 3.0,
            y: 3.0,
            outside: false,
            button: Default::default(),
        },
        ScriptEvent::Key {
            key: "b".to_string(),
        },
        ScriptEvent::Key {
            key: "enter".to_string(),
        },
        ScriptEvent::Key {
            key: "backspace".to_string(),
        },
    ]);
    let mut interaction = Interaction::new(EventQueue::new(host));
    let mut ctx = SessionContext::new();
    let prompt = StepPrompt {
        stage: "igv_0_top_points",
        step: "10",
        hint: "pick",
    };

    let Acquired::Value(points) = interaction.acquire_many(&mut ctx, &prompt).unwrap() else {
        panic!("expected points");
    };
    assert_eq!(points.len(), 2);
    assert_eq!(points.as_slice()[1].x, 2.0);

    let second = interaction.acquire_many(&mut ctx, &prompt).unwrap();
    assert_eq!(second, Acquired::StepBack);
    assert!(ctx.cancel_reason().is_none());
}

#[test]
fn calibration_back_reasks_previous_step() {
    let click = |x: f64, y: f64| ScriptEvent::Click {
        x,
        y,
        outside: false,
        button: Default::default(),
    };
    let back = || ScriptEvent::Key {
        key: "b".to_string(),
    };
    let host = ScriptedHost::new([
        back(),
        click(300.0, 0.0),
        back(),
        click(310.0, 0.0),
        click(600.0, 0.0),
        click(0.0, 700.0),
        click(0.0, 100.0),
    ]);
    let mut interaction = Interaction::new(EventQueue::new(host));
    let mut ctx = SessionContext::new();
    let mut input = TextChannelInput::new(Cursor::new(b"3000\n3100\n6000\n2\n11\n".to_vec()), io::sink());

    let calibration = run_calibration(&mut ctx, &mut interaction, &mut input, &TOP_STEPS).unwrap();
    assert_eq!(calibration.x.pixel1, 310.0);
    assert_eq!(calibration.x.value1, 3100.0);
    assert_eq!(calibration.x.pixel2, 600.0);
    assert_eq!(calibration.y.pixel1, 700.0);
    assert_eq!(calibration.y.value2, 11.0);
    assert_eq!(ctx.stage(), "calibrate_top_y2");
}

/// Answers the first prompts from a list, then behaves as if the dialog was closed.
struct AnsweringDialog {
    answers: Vec<&'static str>,
    asked: usize,
}

impl NumericDialog for AnsweringDialog {
    fn ask(&mut self, _title: &str, _prompt: &str, _initial: &str) -> Option<String> {
        let reply = self.answers.get(self.asked).map(|s| s.to_string());
        self.asked += 1;
        reply
    }
}

#[test]
fn dismissed_value_dialog_cancels_without_export() {
    let dir = temp_dir("dismiss");
    let out = dir.join("curves.csv");
    let events = [calibration_clicks(), pressure_curve(), power_curve()].concat();
    let script = script("0", "[]", &events);

    let dialog = AnsweringDialog {
        answers: vec!["3000", "6000", "2", "11"],
        asked: 0,
    };
    let mut session = Session::new(
        ScriptedHost::new(script.events),
        DialogInput::new(dialog),
        FixedExportPath(Some(out.clone())),
        SessionConfig::default(),
    );

    let err = session.run().unwrap_err();
    assert_eq!(err.cancel_reason(), Some(&CancelReason::InputDismissed));
    assert_eq!(session.context().stage(), "calibrate_bottom_x1");
    assert!(session.host().traces().is_empty());
    assert!(!out.exists());
    assert!(!dir.join("curves.csv.tmp").exists());

    let _ = std::fs::remove_dir_all(&dir);
}
