use super::*;
use crate::calibration::Axis;
use crate::color_utils::Color;
use crate::format::FormatError;
use crate::video::SyntheticVideo;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Session on a 5-frame 200x100 video shown 1:1 on a 200x100 surface.
fn session_with_video(frames: usize) -> Session {
    let mut session = Session::new();
    session.resize_surface(200, 100);
    session
        .attach_video(Box::new(SyntheticVideo::new(frames, 200, 100)))
        .unwrap();
    session
}

/// Calibrate with (10,10)->(0,0) and (110,10)->(100,0).
fn calibrate(session: &mut Session) {
    let mut prompt = ScriptedPrompt::new().answer("0,0").answer("100,0");
    session.click(10.0, 10.0, &mut prompt).unwrap();
    session.click(110.0, 10.0, &mut prompt).unwrap();
}

#[test]
fn test_new_session_has_no_video() {
    let mut session = Session::new();
    assert_eq!(session.mode(), Mode::None);
    assert_eq!(session.frame_count(), 0);
    assert_eq!(session.surface_size(), Size::new(640, 480));
    assert!(session.status_line().starts_with("No video"));

    let outcome = session.click(5.0, 5.0, &mut ScriptedPrompt::new()).unwrap();
    assert_eq!(outcome, ClickOutcome::NoVideo);
    assert!(matches!(session.render(), Err(SessionError::NoVideoLoaded)));
    assert_eq!(session.next_frame(), None);
    assert_eq!(session.prev_frame(), None);
}

#[test]
fn test_attach_video_resets_state() {
    let session = session_with_video(5);
    assert_eq!(session.mode(), Mode::Calibrating);
    assert_eq!(session.current_frame(), 0);
    assert_eq!(session.store().frame_count(), 5);
    assert_eq!(session.store().total_points(), 0);
    assert!(!session.is_calibrated());
    assert_eq!(session.frame_size(), Some(Size::new(200, 100)));
}

#[test]
fn test_attach_empty_video_is_rejected() {
    let mut session = session_with_video(3);
    let result = session.attach_video(Box::new(SyntheticVideo::new(0, 10, 10)));
    assert!(matches!(result, Err(SessionError::Video(VideoError::Empty))));
    // Prior state kept.
    assert_eq!(session.frame_count(), 3);
    assert_eq!(session.store().frame_count(), 3);
}

#[test]
fn test_load_missing_video_keeps_state() {
    let mut session = session_with_video(3);
    let result = session.load_video(Path::new("/definitely/not/here"));
    assert!(matches!(
        result,
        Err(SessionError::Video(VideoError::NotFound { .. }))
    ));
    assert_eq!(session.frame_count(), 3);
    assert!(session.video_path().is_none());
}

#[test]
fn test_calibration_flow() {
    let mut session = session_with_video(5);
    let mut prompt = ScriptedPrompt::new().answer("0,0").answer("100,0");

    let first = session.click(10.0, 10.0, &mut prompt).unwrap();
    assert!(matches!(
        first,
        ClickOutcome::CalibrationPointRecorded { collected: 1, .. }
    ));
    assert_eq!(session.mode(), Mode::Calibrating);

    let second = session.click(110.0, 10.0, &mut prompt).unwrap();
    let ClickOutcome::Calibrated(report) = second else {
        panic!("expected calibration to complete");
    };
    assert!(approx_eq(report.transform.scale_x, 1.0));
    assert!(approx_eq(report.transform.scale_y, 1.0));
    assert_eq!(report.fallback_axes, vec![Axis::Y]);
    assert_eq!(session.mode(), Mode::Adding);
    assert_eq!(prompt.asked(), 2);

    let added = session.click(60.0, 10.0, &mut prompt).unwrap();
    let ClickOutcome::PointAdded {
        frame,
        position,
        real,
        ..
    } = added
    else {
        panic!("expected a point to be added");
    };
    assert_eq!(frame, 0);
    assert_eq!(position, 1);
    let real = real.unwrap();
    assert!(approx_eq(real.x, 50.0));
    assert!(approx_eq(real.y, 0.0));
    // Adding does not prompt.
    assert_eq!(prompt.asked(), 2);
}

#[test]
fn test_dismissed_calibration_prompt_rolls_back() {
    let mut session = session_with_video(2);
    let mut prompt = ScriptedPrompt::new().dismiss().answer("");

    let outcome = session.click(10.0, 10.0, &mut prompt).unwrap();
    assert!(matches!(outcome, ClickOutcome::CalibrationCancelled { .. }));
    assert!(!outcome.changed_state());

    let outcome = session.click(20.0, 10.0, &mut prompt).unwrap();
    assert!(matches!(outcome, ClickOutcome::CalibrationCancelled { .. }));

    let (pixels, reals) = session.calibration_points();
    assert!(pixels.is_empty());
    assert!(reals.is_empty());
}

#[test]
fn test_blank_calibration_answer_is_invalid() {
    let mut session = session_with_video(2);
    let mut prompt = ScriptedPrompt::new().answer("   ");

    let err = session.click(10.0, 10.0, &mut prompt).unwrap_err();
    assert!(matches!(err, SessionError::InvalidCoordinate { ref input } if input.is_empty()));
    assert!(session.calibration_points().0.is_empty());
    assert_eq!(session.mode(), Mode::Calibrating);
}

#[test]
fn test_invalid_calibration_input_rolls_back() {
    let mut session = session_with_video(2);
    let mut prompt = ScriptedPrompt::new().answer("north").answer("0,0");

    let err = session.click(10.0, 10.0, &mut prompt).unwrap_err();
    assert!(matches!(err, SessionError::InvalidCoordinate { ref input } if input == "north"));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(session.calibration_points().0.is_empty());

    session.click(10.0, 10.0, &mut prompt).unwrap();
    assert_eq!(session.calibration_points().0.len(), 1);
    assert_eq!(session.calibration_points().1.len(), 1);
}

#[test]
fn test_enter_adding_requires_calibration() {
    let mut session = session_with_video(2);
    assert!(matches!(
        session.enter_adding(),
        Err(SessionError::NotCalibrated)
    ));
    assert_eq!(session.mode(), Mode::Calibrating);

    calibrate(&mut session);
    session.enter_deleting();
    assert!(session.enter_adding().is_ok());
    assert_eq!(session.mode(), Mode::Adding);
}

#[test]
fn test_click_without_mode_is_refused() {
    let mut session = session_with_video(2);
    session.clear_mode();
    let err = session
        .click(10.0, 10.0, &mut ScriptedPrompt::new())
        .unwrap_err();
    assert!(matches!(err, SessionError::NoModeSelected));
    assert_eq!(err.kind(), ErrorKind::UsageOrder);
}

#[test]
fn test_click_in_padding_is_ignored() {
    let mut session = Session::new();
    session.resize_surface(400, 100);
    session
        .attach_video(Box::new(SyntheticVideo::new(2, 200, 100)))
        .unwrap();
    calibrate_letterboxed(&mut session);

    // Image occupies display x in [100, 300).
    let outcome = session
        .click(50.0, 50.0, &mut ScriptedPrompt::new())
        .unwrap();
    assert!(matches!(outcome, ClickOutcome::OutsideImage { .. }));
    assert_eq!(session.store().total_points(), 0);

    let outcome = session
        .click(150.0, 50.0, &mut ScriptedPrompt::new())
        .unwrap();
    let ClickOutcome::PointAdded { pixel, .. } = outcome else {
        panic!("expected a point to be added");
    };
    assert!(approx_eq(pixel.x, 50.0));
    assert!(approx_eq(pixel.y, 50.0));
}

fn calibrate_letterboxed(session: &mut Session) {
    let mut prompt = ScriptedPrompt::new().answer("0,0").answer("10,10");
    session.click(100.0, 0.0, &mut prompt).unwrap();
    session.click(200.0, 50.0, &mut prompt).unwrap();
    assert_eq!(session.mode(), Mode::Adding);
}

#[test]
fn test_delete_nearest_point() {
    let mut session = session_with_video(3);
    calibrate(&mut session);
    let mut prompt = ScriptedPrompt::new();
    session.click(20.0, 20.0, &mut prompt).unwrap();
    session.click(80.0, 20.0, &mut prompt).unwrap();

    session.enter_deleting();
    let outcome = session.click(75.0, 25.0, &mut prompt).unwrap();
    let ClickOutcome::PointRemoved { frame, removed } = outcome else {
        panic!("expected a point to be removed");
    };
    assert_eq!(frame, 0);
    assert_eq!(removed.index, 1);
    assert!(approx_eq(removed.pixel.x, 80.0));

    let remaining = session.store().pixel_points(0).unwrap();
    assert_eq!(remaining, &[PixelPoint::new(20.0, 20.0)]);
    assert!(session.store().is_consistent());
}

#[test]
fn test_delete_on_empty_frame() {
    let mut session = session_with_video(3);
    session.enter_deleting();
    let outcome = session
        .click(10.0, 10.0, &mut ScriptedPrompt::new())
        .unwrap();
    assert_eq!(outcome, ClickOutcome::NothingToDelete { frame: 0 });
}

#[test]
fn test_points_are_per_frame() {
    let mut session = session_with_video(3);
    calibrate(&mut session);
    let mut prompt = ScriptedPrompt::new();

    session.click(20.0, 20.0, &mut prompt).unwrap();
    session.next_frame();
    session.click(30.0, 30.0, &mut prompt).unwrap();
    session.click(40.0, 40.0, &mut prompt).unwrap();

    assert_eq!(session.store().pixel_points(0).unwrap().len(), 1);
    assert_eq!(session.store().pixel_points(1).unwrap().len(), 2);
    assert_eq!(session.store().pixel_points(2).unwrap().len(), 0);
    assert_eq!(session.store().total_points(), 3);
    assert!(session.status_line().contains("Frame: 2/3"));
}

#[test]
fn test_prev_next_clamp() {
    let mut session = session_with_video(3);
    assert_eq!(session.prev_frame(), Some(0));
    assert_eq!(session.next_frame(), Some(1));
    assert_eq!(session.next_frame(), Some(2));
    assert_eq!(session.next_frame(), Some(2));
    assert_eq!(session.prev_frame(), Some(1));
}

#[test]
fn test_jump_bounds() {
    let mut session = session_with_video(5);

    assert_eq!(session.jump_to_frame(1).unwrap(), 0);
    assert_eq!(session.jump_to_frame(5).unwrap(), 4);

    for bad in [0, 6, -3] {
        let err = session.jump_to_frame(bad).unwrap_err();
        assert!(matches!(
            err,
            SessionError::JumpOutOfRange { requested, frame_count: 5 } if requested == bad
        ));
    }
    // Failed jumps leave the frame alone.
    assert_eq!(session.current_frame(), 4);
}

#[test]
fn test_jump_dialog() {
    let mut session = session_with_video(5);

    let mut prompt = ScriptedPrompt::new().answer(" 3 ");
    assert_eq!(session.jump_dialog(&mut prompt).unwrap(), Some(2));

    let mut prompt = ScriptedPrompt::new().dismiss();
    assert_eq!(session.jump_dialog(&mut prompt).unwrap(), None);
    assert_eq!(session.current_frame(), 2);

    let mut prompt = ScriptedPrompt::new().answer("three");
    assert!(matches!(
        session.jump_dialog(&mut prompt),
        Err(SessionError::InvalidFrameNumber { .. })
    ));
}

#[test]
fn test_set_frame() {
    let mut session = session_with_video(2);
    assert_eq!(session.set_frame(1).unwrap(), 1);
    assert!(matches!(
        session.set_frame(2),
        Err(SessionError::FrameOutOfRange {
            index: 2,
            frame_count: 2
        })
    ));
    assert!(matches!(
        Session::new().set_frame(0),
        Err(SessionError::NoVideoLoaded)
    ));
}

#[test]
fn test_render_draws_markers() {
    let mut session = session_with_video(3);
    calibrate(&mut session);
    session
        .click(60.0, 60.0, &mut ScriptedPrompt::new())
        .unwrap();

    let view = session.render().unwrap();
    assert_eq!(view.status(), "Frame: 1/3");
    assert_eq!(view.image.dimensions(), (200, 100));
    assert_eq!(view.data_points, vec![PixelPoint::new(60.0, 60.0)]);
    assert_eq!(view.calibration_points.len(), 2);
    assert_eq!(view.mode, Mode::Adding);
    assert_eq!(
        view.image.get_pixel(60, 60),
        &session.settings().data_color.to_pixel()
    );
}

#[test]
fn test_render_hides_calibration_points() {
    let mut session = session_with_video(2);
    calibrate(&mut session);
    let settings = DisplaySettings {
        show_calibration_points: false,
        ..DisplaySettings::default()
    };
    session.apply_settings(settings).unwrap();

    let view = session.render().unwrap();
    assert!(view.calibration_points.is_empty());
}

#[test]
fn test_render_broken_frame_keeps_session() {
    let mut session = Session::new();
    session
        .attach_video(Box::new(SyntheticVideo::with_frames(3).with_broken_frame(1)))
        .unwrap();
    session.next_frame();

    let err = session.render().unwrap_err();
    assert!(matches!(err, SessionError::Video(VideoError::Decode { .. })));
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert_eq!(session.current_frame(), 1);

    session.next_frame();
    assert!(session.render().is_ok());
}

#[test]
fn test_recalibration_recomputes_points() {
    let mut session = session_with_video(2);
    calibrate(&mut session);
    session
        .click(60.0, 10.0, &mut ScriptedPrompt::new())
        .unwrap();

    // Entering calibration again leaves stored real points alone.
    session.enter_calibrating();
    assert!(!session.is_calibrated());
    let real = session.store().real_points(0).unwrap()[0].unwrap();
    assert!(approx_eq(real.x, 50.0));

    // New calibration at half the scale.
    let mut prompt = ScriptedPrompt::new().answer("0,0").answer("50,0");
    session.click(10.0, 10.0, &mut prompt).unwrap();
    session.click(110.0, 10.0, &mut prompt).unwrap();

    let real = session.store().real_points(0).unwrap()[0].unwrap();
    assert!(approx_eq(real.x, 25.0));
}

#[test]
fn test_apply_settings_rejects_zero_radius() {
    let mut session = Session::new();
    let settings = DisplaySettings {
        data_radius: 0,
        ..DisplaySettings::default()
    };
    assert!(matches!(
        session.apply_settings(settings),
        Err(SessionError::Settings(_))
    ));
    assert_eq!(session.settings(), &DisplaySettings::default());
}

#[test]
fn test_edit_settings() {
    let mut session = Session::new();
    let mut prompt = ScriptedPrompt::new()
        .answer("7")
        .dismiss()
        .answer("")
        .answer("#ff0000")
        .answer("no");

    let updated = session.edit_settings(&mut prompt).unwrap();
    assert_eq!(updated.calibration_radius, 7);
    assert_eq!(updated.data_radius, DisplaySettings::default().data_radius);
    assert_eq!(updated.calibration_color, Color::GREEN);
    assert_eq!(updated.data_color, Color::RED);
    assert!(!updated.show_calibration_points);
    assert_eq!(session.settings(), &updated);
}

#[test]
fn test_edit_settings_rejects_whole_form() {
    let mut session = Session::new();
    let mut prompt = ScriptedPrompt::new()
        .answer("7")
        .answer("-1")
        .answer("#00ff00")
        .answer("#0000ff")
        .answer("yes");

    let err = session.edit_settings(&mut prompt).unwrap_err();
    assert!(matches!(err, SessionError::Settings(_)));
    assert_eq!(session.settings(), &DisplaySettings::default());
}

#[test]
fn test_oversized_radius_is_rejected_and_render_still_works() {
    let mut session = session_with_video(2);
    calibrate(&mut session);
    session
        .click(60.0, 60.0, &mut ScriptedPrompt::new())
        .unwrap();

    let mut prompt = ScriptedPrompt::new()
        .dismiss()
        .answer("4294967295")
        .dismiss()
        .dismiss()
        .dismiss();
    let err = session.edit_settings(&mut prompt).unwrap_err();
    assert!(matches!(err, SessionError::Settings(_)));
    assert_eq!(session.settings(), &DisplaySettings::default());

    let view = session.render().unwrap();
    assert_eq!(view.data_points, vec![PixelPoint::new(60.0, 60.0)]);
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clicks.json");

    let mut session = session_with_video(3);
    calibrate(&mut session);
    session
        .click(60.0, 10.0, &mut ScriptedPrompt::new())
        .unwrap();
    assert!(session.store().is_dirty());
    session.save(&path).unwrap();
    assert!(!session.store().is_dirty());

    let mut other = session_with_video(3);
    other.load(&path).unwrap();
    assert_eq!(other.store().pixel_points(0).unwrap(), &[PixelPoint::new(60.0, 10.0)]);
    let real = other.store().real_points(0).unwrap()[0].unwrap();
    assert!(approx_eq(real.x, 50.0));
}

#[test]
fn test_load_rejects_frame_count_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clicks.json");

    let mut session = session_with_video(3);
    session.save(&path).unwrap();

    let mut other = session_with_video(4);
    let err = other.load(&path).unwrap_err();
    assert!(matches!(
        err,
        SessionError::FrameCountMismatch {
            file_frames: 3,
            video_frames: 4
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert_eq!(other.store().frame_count(), 4);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new();
    let err = session.load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, SessionError::Format(FormatError::Io(_))));
    assert_eq!(err.kind(), ErrorKind::Resource);
}

#[test]
fn test_store_stays_consistent() {
    let mut session = session_with_video(2);
    let mut prompt = ScriptedPrompt::new();
    calibrate(&mut session);
    for i in 0..5 {
        session
            .click(10.0 + f64::from(i) * 20.0, 50.0, &mut prompt)
            .unwrap();
    }
    session.enter_deleting();
    session.click(50.0, 50.0, &mut prompt).unwrap();
    session.click(0.0, 0.0, &mut prompt).unwrap();

    assert!(session.store().is_consistent());
    assert_eq!(session.store().pixel_points(0).unwrap().len(), 3);
}
