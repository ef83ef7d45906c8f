//! Play command implementation
//!
//! Drives a [`Preview`] with a hand-fired ticker at a fixed refresh interval
//! and prints every frame change, so timing can be checked without a display.

use std::process::ExitCode;

use crate::lookup::find_sprite;
use crate::playback::{ManualTicker, Preview};
use crate::validate::validate_speed;

use super::{lookup_failed, Workspace, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the play command
pub fn run_play(
    ws: &Workspace,
    sprite: &str,
    speed: Option<f64>,
    duration: u64,
    refresh: Option<u32>,
) -> ExitCode {
    let sprite = match find_sprite(ws.store.document(), sprite) {
        Ok(s) => s,
        Err(e) => return lookup_failed(e),
    };

    let speed = match validate_speed(speed.unwrap_or(ws.store.session().playback_speed)) {
        Ok(speed) => speed,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let refresh = refresh.unwrap_or(ws.config.playback.refresh_ms);
    if refresh == 0 {
        eprintln!("Error: --refresh must be at least 1ms");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let session = ws.store.session();
    let start = if session.selected_sprite_id.as_deref() == Some(sprite.id.as_str()) {
        session.selected_frame_index.min(sprite.frame_count().saturating_sub(1))
    } else {
        0
    };

    println!(
        "{}: {} frame(s), {}ms per loop at {}x",
        sprite.name,
        sprite.frame_count(),
        sprite.total_duration(),
        speed
    );
    for (at, frame) in simulate(&sprite.durations(), start, speed, duration, u64::from(refresh)) {
        println!("t={}ms frame {}", at, frame);
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Frame changes seen when ticking every `refresh` ms for `duration` ms,
/// starting at frame `start`. The first entry is the starting frame at t=0.
fn simulate(durations: &[u32], start: usize, speed: f64, duration: u64, refresh: u64) -> Vec<(u64, usize)> {
    let ticker = ManualTicker::new();
    let mut preview = Preview::new(ticker.clone());
    preview.set_frame(start);
    preview.play();

    let mut changes = vec![(0, preview.current_frame())];
    let mut now = 0;
    while now <= duration && ticker.fire().is_some() {
        if let Some(frame) = preview.on_tick(now, durations, speed) {
            changes.push((now, frame));
        }
        now += refresh;
    }
    preview.stop();
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::workspace;

    #[test]
    fn test_simulate_respects_durations() {
        let changes = simulate(&[100, 50], 0, 1.0, 400, 10);
        assert_eq!(changes, vec![(0, 0), (100, 1), (150, 0), (250, 1), (300, 0), (400, 1)]);
    }

    #[test]
    fn test_simulate_speed_scales_windows() {
        let changes = simulate(&[100, 100], 0, 2.0, 200, 10);
        assert_eq!(changes, vec![(0, 0), (50, 1), (100, 0), (150, 1), (200, 0)]);
    }

    #[test]
    fn test_simulate_single_frame_never_changes() {
        assert_eq!(simulate(&[100], 0, 1.0, 1000, 16), vec![(0, 0)]);
    }

    #[test]
    fn test_simulate_starts_at_selected_frame() {
        let changes = simulate(&[100, 100, 100], 2, 1.0, 100, 50);
        assert_eq!(changes, vec![(0, 2), (100, 0)]);
    }

    #[test]
    fn test_play_validates_arguments() {
        let (_temp, mut ws) = workspace();
        ws.store.create_sprite("hero", "cat_player");
        assert_eq!(run_play(&ws, "hero", Some(5.0), 100, None), ExitCode::from(EXIT_INVALID_ARGS));
        assert_eq!(run_play(&ws, "hero", None, 100, Some(0)), ExitCode::from(EXIT_INVALID_ARGS));
        assert_eq!(run_play(&ws, "hero", Some(0.5), 100, None), ExitCode::from(EXIT_SUCCESS));
    }
}
