use rstest::rstest;
use teleop_core::{
    ChannelSample, DEFAULT_QUALITY, FilterError, RzdSteering, Shaper, ShapingCfg, SteeringProcessor, VelocityRequest,
    XdSteering, YdSteering,
};

const DT: f64 = 1.0 / 30.0;

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn forward() -> XdSteering {
    XdSteering::new(-3.0, 9.5, 1.5, 0.5, 7.0)
}

#[test]
fn forward_ramp_is_derated_with_speed() {
    let mut xd = forward();
    assert!(close(xd.update(9.5, DT), 0.05, 1e-12));
    assert!(close(xd.update(9.5, DT), 0.099_761_904_761_904_77, 1e-12));
    for _ in 2..30 {
        xd.update(9.5, DT);
    }
    assert!(close(xd.cmd_d(), 1.400_887_379_076_582_1, 1e-9));
    assert!(close(xd.cmd_req(), 9.5, 0.0));
}

#[test]
fn forward_reaches_max_after_a_long_ramp() {
    let mut xd = forward();
    let mut steps = 0;
    while xd.cmd_d() < 9.5 - 1e-9 && steps < 1000 {
        xd.update(9.5, DT);
        steps += 1;
    }
    assert!((375..=385).contains(&steps), "took {steps} steps");
    // Held at the limit afterwards
    for _ in 0..10 {
        assert!(close(xd.update(20.0, DT), 9.5, 1e-9));
    }
}

#[test]
fn forward_slew_floor_holds_at_high_speed() {
    let mut xd = forward();
    xd.reset(9.0);
    // 1.5 - 9 * (1/7) is below the floor
    assert!(close(xd.effective_slew_limit(), 0.5, 1e-12));
    let out = xd.update(-3.0, DT);
    assert!(close(out, 9.0 - 0.5 * DT, 1e-12));
}

#[test]
fn lateral_is_saturated_and_slewed() {
    let mut yd = YdSteering::new(-0.5, 0.5, 0.75);
    assert!(close(yd.update(1.0, DT), 0.025, 1e-12));
    assert!(close(yd.cmd_req(), 0.5, 0.0));
    for _ in 0..30 {
        yd.update(1.0, DT);
    }
    assert!(close(yd.cmd_d(), 0.5, 1e-12));
    for _ in 0..60 {
        yd.update(-1.0, DT);
    }
    assert!(close(yd.cmd_d(), -0.5, 1e-12));
}

#[rstest]
#[case(0.0)]
#[case(0.1)]
#[case(-0.24)]
fn yaw_ceiling_is_static_max_at_walking_pace(#[case] xd: f64) {
    let rzd = RzdSteering::new(-1.0, 1.0, 0.4, 0.39);
    assert_eq!(rzd.yaw_rate_ceiling(xd), 1.0);
}

#[test]
fn yaw_ceiling_follows_coordinated_turn() {
    let roll = 0.4_f64.atan();
    let mut rzd = RzdSteering::new(-2.5, 2.5, 1000.0, roll);
    assert!(close(rzd.yaw_rate_ceiling(2.0), 1.962, 1e-12));
    assert!(close(rzd.yaw_rate_ceiling(-2.0), 1.962, 1e-12));

    let out = rzd.update(2.5, 2.0, DT);
    assert!(close(rzd.cmd_req(), 2.5, 0.0));
    assert!(close(out, 1.962, 1e-12));
    let out = rzd.update(-2.5, 2.0, DT);
    assert!(close(out, -1.962, 1e-12));
}

#[test]
fn yaw_ceiling_at_top_speed() {
    let rzd = RzdSteering::new(-1.0, 1.0, 0.4, 0.39);
    assert!(close(rzd.yaw_rate_ceiling(9.5), 0.424_468_286_067_706_9, 1e-12));
}

#[test]
fn reset_is_idempotent() {
    let mut xd = forward();
    xd.set_filter_params(DT, 0.9, Some(0.5)).unwrap();
    for _ in 0..20 {
        xd.update(5.0, DT);
    }
    xd.reset(1.25);
    let once = xd.sample();
    xd.reset(1.25);
    assert_eq!(xd.sample(), once);
    assert_eq!(once, ChannelSample {
        cmd_req: 1.25,
        cmd_d_unfilt: 1.25,
        cmd_d: 1.25
    });
    assert!(!xd.filter().unwrap().is_primed());
}

#[test]
fn zero_dt_holds_every_channel() {
    let mut shaper = Shaper::new(&ShapingCfg::default(), DT).unwrap();
    let req = VelocityRequest {
        xd: 9.0,
        yd: 0.5,
        rzd: 1.0,
    };
    let cmd = shaper.update(&req, 0.0);
    assert_eq!((cmd.xd, cmd.yd, cmd.rzd), (0.0, 0.0, 0.0));
    assert_eq!(shaper.xd.cmd_req(), 9.0);
}

#[rstest]
#[case(Some(0.0))]
#[case(Some(-0.5))]
#[case(Some(f64::NAN))]
fn zero_or_invalid_quality_is_rejected_not_defaulted(#[case] q: Option<f64>) {
    let mut xd = forward();
    xd.set_filter_params(DT, 0.9, Some(0.5)).unwrap();
    let err = xd.set_filter_params(DT, 0.9, q).unwrap_err();
    let FilterError::InvalidConfiguration(msg) = err;
    assert!(msg.starts_with("quality"), "{msg}");
    // The previous stage is kept
    assert_eq!(xd.filter().map(|f| f.design().quality), Some(0.5));
}

#[test]
fn missing_quality_selects_butterworth() {
    let mut rzd = RzdSteering::new(-1.0, 1.0, 1.2, 0.39);
    rzd.set_filter_params(DT, 3.0, None).unwrap();
    assert_eq!(rzd.filter().map(|f| f.design().quality), Some(DEFAULT_QUALITY));
}

#[test]
fn cleared_filter_passes_the_slewed_value_through() {
    let mut xd = forward();
    let mut rzd = RzdSteering::new(-1.0, 1.0, 1.2, 0.39);
    xd.set_filter_params(DT, 0.9, Some(0.5)).unwrap();
    rzd.set_filter_params(DT, 3.0, Some(0.5)).unwrap();
    for _ in 0..10 {
        let v = xd.update(9.5, DT);
        rzd.update(1.0, v, DT);
    }
    assert!(xd.cmd_d() < xd.cmd_d_unfilt());
    assert!(rzd.cmd_d() < rzd.cmd_d_unfilt());

    xd.clear_filter();
    rzd.clear_filter();
    assert!(xd.filter().is_none() && rzd.filter().is_none());
    let v = xd.update(9.5, DT);
    rzd.update(1.0, v, DT);
    assert_eq!(xd.cmd_d(), xd.cmd_d_unfilt());
    assert_eq!(rzd.cmd_d(), rzd.cmd_d_unfilt());
}

#[test]
fn filtered_forward_and_yaw_converge() {
    let mut xd = forward();
    xd.set_filter_params(DT, 0.9, Some(0.5)).unwrap();
    let mut rzd = RzdSteering::new(-1.0, 1.0, 0.4 / 0.33, 0.39);
    rzd.set_filter_params(DT, 3.0, Some(0.5)).unwrap();

    let tick = |xd: &mut XdSteering, rzd: &mut RzdSteering| {
        let v = xd.update(9.0, DT);
        rzd.update(1.0, v, DT);
    };

    for _ in 0..90 {
        tick(&mut xd, &mut rzd);
    }
    assert!(close(xd.cmd_d_unfilt(), 3.666_888_254_762_247, 1e-9));
    assert!(close(xd.cmd_d(), 3.307_215_379_635_491_3, 1e-9));
    // The filter lags the slew output while ramping
    assert!(xd.cmd_d() < xd.cmd_d_unfilt());
    assert_eq!(rzd.cmd_req(), 1.0);
    assert!(close(rzd.cmd_d_unfilt(), 1.0, 1e-12));
    assert!(close(rzd.cmd_d(), 1.0, 1e-6));

    for _ in 90..690 {
        tick(&mut xd, &mut rzd);
    }
    assert!(close(xd.cmd_d_unfilt(), 9.0, 1e-12));
    assert!(close(xd.cmd_d(), 9.0, 1e-6));
    let ceiling = 9.81 / 9.0 * 0.39_f64.tan();
    assert!(close(ceiling, 0.448_049_857_515_91, 1e-9));
    assert!(close(rzd.cmd_d(), ceiling, 1e-4));
}

#[test]
fn shaper_matches_individual_processors() {
    let cfg = ShapingCfg::default();
    let mut shaper = Shaper::new(&cfg, DT).unwrap();
    let req = VelocityRequest {
        xd: 9.0,
        yd: 0.0,
        rzd: 1.0,
    };
    for _ in 0..90 {
        shaper.update(&req, DT);
    }
    let cmd = shaper.command();
    assert!(close(cmd.xd, 3.307_215_379_635_491_3, 1e-9));
    assert_eq!(cmd.yd, 0.0);
    assert!(close(cmd.rzd, 1.0, 1e-6));
}
