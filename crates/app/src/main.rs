//! Headless two-instance zoom demo.
//!
//! Runs an authoritative App and an observer App side by side, joined by an
//! in-process loopback link, drives the authority's viewer from a scripted
//! timeline and logs both views as they converge.
//!
//! Environment:
//! - `EYEZOOM_PARAMS`: path to a JSON `ZoomParams` file (optional).
//! - `EYEZOOM_TICKS`: number of fixed ticks to run (default 256).

mod loopback;
mod script;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use view_zoom::{
    Eye, LocalViewer, ReplicationRole, ViewZoomPlugin, ZoomActive, ZoomParams, ZoomState,
};

use loopback::{Loopback, NetId};

const DEFAULT_TICKS: u32 = 256;
const STATUS_INTERVAL: u32 = 32;
const VIEWER_NET_ID: u32 = 1;

fn main() {
    let mut authority = build_instance(ReplicationRole::Authoritative, true);
    let mut observer = build_instance(ReplicationRole::Observer, false);

    if let Ok(path) = std::env::var("EYEZOOM_PARAMS") {
        let params = ZoomParams::load_or_warn(path);
        info!("eyezoom: zoom parameters {:?}", params);
        observer.insert_resource(params.clone());
        authority.insert_resource(params);
    }
    let ticks = tick_count();

    let max_zoom = authority
        .world()
        .resource::<ZoomParams>()
        .default_max_zoom();
    let auth_viewer = authority
        .world_mut()
        .spawn((
            Eye::default(),
            ZoomState::new(max_zoom),
            LocalViewer,
            NetId(VIEWER_NET_ID),
        ))
        .id();
    let obs_viewer = observer
        .world_mut()
        .spawn((Eye::default(), ZoomState::new(max_zoom), NetId(VIEWER_NET_ID)))
        .id();

    info!(
        "eyezoom: running {} ticks (authority {:?}, observer {:?})",
        ticks, auth_viewer, obs_viewer
    );

    let timeline = script::default_timeline();
    let mut link = Loopback::default();

    for tick in 0..ticks {
        for &(_, cue) in timeline.iter().filter(|(at, _)| *at == tick) {
            debug!("tick {}: {:?}", tick, cue);
            if script::apply(authority.world_mut(), auth_viewer, cue) {
                link.push(VIEWER_NET_ID, vec![0xff; 3]);
            }
        }

        authority.update();
        link.collect(authority.world());
        link.drain(observer.world_mut());
        observer.update();

        if tick % STATUS_INTERVAL == 0 || tick + 1 == ticks {
            info!(
                "tick {:>4}: authority {} | observer {}",
                tick,
                describe(authority.world(), auth_viewer),
                describe(observer.world(), obs_viewer)
            );
        }
    }

    info!(
        "eyezoom: done, {} packets sent, {} rejected",
        link.sent(),
        link.rejected()
    );

    for app in [&mut authority, &mut observer] {
        app.world_mut().send_event(AppExit::Success);
        app.update();
    }
}

/// A headless instance whose every `update` advances exactly one fixed tick.
fn build_instance(role: ReplicationRole, with_log: bool) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    // Only one instance may install the global log subscriber.
    if with_log {
        app.add_plugins(LogPlugin::default());
    }
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(timestep))
        .insert_resource(role)
        .add_plugins(ViewZoomPlugin);
    app.update();
    app
}

fn tick_count() -> u32 {
    match std::env::var("EYEZOOM_TICKS") {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!(
                "EYEZOOM_TICKS={:?} is not a tick count ({}), using {}",
                raw, e, DEFAULT_TICKS
            );
            DEFAULT_TICKS
        }),
        Err(_) => DEFAULT_TICKS,
    }
}

fn describe(world: &World, entity: Entity) -> String {
    match (world.get::<ZoomState>(entity), world.get::<Eye>(entity)) {
        (Some(state), Some(eye)) => format!(
            "eye {:.3} target {:.3} max {:.3}{}",
            eye.zoom,
            state.target(),
            state.max_zoom(),
            if world.get::<ZoomActive>(entity).is_some() {
                " (moving)"
            } else {
                ""
            }
        ),
        _ => "no zoom control".to_string(),
    }
}
