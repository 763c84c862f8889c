use game::{Game, GameState};
use gridcast::{Settings, World};
use sdl2::event::Event;
use std::collections::HashSet;
use std::time::{Duration, Instant};

mod game;

// helper trait to convert strings into std::error types
trait StringToAnyhow<T> {
    fn ah(self) -> anyhow::Result<T>;
}

impl<T> StringToAnyhow<T> for Result<T, String> {
    fn ah(self) -> anyhow::Result<T> {
        self.map_err(|err| anyhow::anyhow!("{err}"))
    }
}

// longest frame step movement is scaled by
const MAX_DELTA: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("GRIDCAST_LOG");
    let settings = Settings::from_env()?;

    // world first, so a bad map fails before a window opens
    log::info!("initializing world");
    let world = World::load(&settings)?;

    // sdl boilerplate
    log::info!("initializing sdl2");
    let sdl_ctx = sdl2::init().ah()?;
    log::info!("initializing video");
    let video = sdl_ctx.video().ah()?;

    log::info!("initializing window");
    let window = video
        .window("gridcast", settings.width as u32, settings.height as u32)
        .position_centered()
        .build()?;

    log::info!("creating canvas");
    let canvas = window.into_canvas().build()?;
    log::info!("pumping events");
    let mut events = sdl_ctx.event_pump().ah()?;

    let mut keys = HashSet::new();
    let mut game = Game::new(canvas, world, &settings);

    let frame = Duration::from_secs(1) / settings.target_fps as u32;
    let mut last = Instant::now();
    let mut frames = 0u32;
    let mut last_fps = Instant::now();

    'main_loop: loop {
        let prev = Instant::now();
        let dt = (prev - last).min(MAX_DELTA).as_secs_f32();
        last = prev;

        // handle events
        for ev in events.poll_iter() {
            match ev {
                Event::Quit { .. } => break 'main_loop,
                Event::KeyDown {
                    keycode: Some(k),
                    repeat,
                    ..
                } => {
                    keys.insert(k);

                    if !repeat {
                        game.key_once(k);
                    }
                }
                Event::KeyUp {
                    keycode: Some(k), ..
                } => {
                    keys.remove(&k);
                }
                _ => {}
            }
        }

        if game.game_state == GameState::Exit {
            break;
        }

        game.update(&keys, &events.mouse_state(), dt);

        // draw game
        if let Err(err) = game.draw() {
            log::error!("error while in game state {:?}: {err}", game.game_state);
            return Err(err);
        }
        game.canvas.present();

        frames += 1;
        let since = last_fps.elapsed();
        if since >= Duration::from_secs(1) {
            log::debug!("fps: {:.1}", frames as f32 / since.as_secs_f32());
            frames = 0;
            last_fps = Instant::now();
        }

        let diff = prev.elapsed();
        if diff < frame {
            std::thread::sleep(frame - diff);
        }
    }

    log::info!("exiting");
    Ok(())
}
