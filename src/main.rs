//! Entry point and game loop.
//!
//! The loop owns all timing: it feeds `advance_reveal` to the session at
//! the configured reveal cadence and routes key presses into cursor
//! moves and selection toggles. The session itself never sees a clock.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use crossterm::style::Color;
use rand::rngs::ThreadRng;

use config::GameConfig;
use domain::card::SymbolCatalog;
use domain::mode::GameMode;
use sim::event::GameEvent;
use sim::round::{Phase, Session};
use sim::score::ScoreStore;
use ui::input::InputState;
use ui::renderer::{grid_cols, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    let catalog = build_catalog(&config);
    let mut scores = ScoreStore::load_default();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&config, &catalog, &mut scores, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for training!");
    println!(
        "Best levels — Classic: {}, N-Back: {}",
        scores.best(GameMode::Classic),
        scores.best(GameMode::NBack)
    );
}

fn build_catalog(config: &GameConfig) -> SymbolCatalog {
    if config.symbols.is_empty() {
        return SymbolCatalog::builtin();
    }
    match SymbolCatalog::from_symbols(config.symbols.clone()) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Warning: ignoring [catalog] override: {e}");
            SymbolCatalog::builtin()
        }
    }
}

// ── App state ──

enum Screen {
    Title { cursor: usize },
    Playing(Box<PlayState>),
}

/// Presentation-side state for one mode visit. Everything here is
/// timing and chrome; the rules live in the `Session`.
struct PlayState {
    session: Session,
    /// Grid cursor (index into display cards).
    cursor: usize,
    reveal: RevealTimer,
    banner: Option<Banner>,
    banner_until: Option<Instant>,
    /// Debounce: a toggle is accepted only after the previous one's
    /// flash window has passed.
    last_tap: Instant,
}

enum RevealTimer {
    Idle,
    /// Current card is up until the deadline.
    Showing { until: Instant },
    /// Blank flip between two cards.
    Gap { until: Instant },
}

struct Banner {
    text: String,
    color: Color,
}

fn game_loop(
    config: &GameConfig,
    catalog: &SymbolCatalog,
    scores: &mut ScoreStore,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut rng: ThreadRng = rand::thread_rng();
    let mut screen = Screen::Title { cursor: 0 };
    let mut dirty = true;

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }
        if kb.resized() {
            dirty = true;
        }

        let mut next_screen: Option<Screen> = None;
        match &mut screen {
            Screen::Title { cursor } => {
                let mut quit = false;
                for &key in kb.presses() {
                    match key {
                        KeyCode::Up | KeyCode::Char('k') => {
                            *cursor = cursor.saturating_sub(1);
                            dirty = true;
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            *cursor = (*cursor + 1).min(GameMode::ALL.len() - 1);
                            dirty = true;
                        }
                        KeyCode::Enter | KeyCode::Char(' ') => {
                            let mode = GameMode::ALL[*cursor];
                            next_screen = Some(Screen::Playing(Box::new(PlayState {
                                session: Session::new(
                                    mode,
                                    config.progression,
                                    catalog.max_level(),
                                ),
                                cursor: 0,
                                reveal: RevealTimer::Idle,
                                banner: None,
                                banner_until: None,
                                last_tap: Instant::now(),
                            })));
                        }
                        KeyCode::Char('q') | KeyCode::Esc => quit = true,
                        _ => {}
                    }
                }
                if quit {
                    break;
                }
            }

            Screen::Playing(play) => {
                let mut back_to_title = false;
                handle_play_keys(
                    play,
                    kb.presses(),
                    config,
                    catalog,
                    scores,
                    sound,
                    &mut rng,
                    &mut back_to_title,
                    &mut dirty,
                );
                if back_to_title {
                    next_screen = Some(Screen::Title { cursor: 0 });
                } else {
                    tick_play_timers(play, config, sound, &mut dirty);
                }
            }
        }
        if let Some(next) = next_screen {
            screen = next;
            dirty = true;
        }

        if dirty {
            draw(renderer, &screen, scores)?;
            dirty = false;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Input handling (Playing) ──

#[allow(clippy::too_many_arguments)]
fn handle_play_keys(
    play: &mut PlayState,
    presses: &[KeyCode],
    config: &GameConfig,
    catalog: &SymbolCatalog,
    scores: &mut ScoreStore,
    sound: Option<&SoundEngine>,
    rng: &mut ThreadRng,
    back_to_title: &mut bool,
    dirty: &mut bool,
) {
    for &key in presses {
        match play.session.phase() {
            Phase::Ready => match key {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    match play.session.start_round(catalog, rng) {
                        Ok(events) => {
                            play.banner = None;
                            play.banner_until = None;
                            apply_events(play, &events, config, sound);
                        }
                        Err(e) => {
                            // Progression clamping makes this unreachable
                            // unless the config is broken; report, stay Ready.
                            play.banner = Some(Banner {
                                text: e.to_string(),
                                color: Color::Red,
                            });
                            play.banner_until = None;
                        }
                    }
                    *dirty = true;
                }
                KeyCode::Esc => *back_to_title = true,
                _ => {}
            },

            // No cancellation mid-round: keys are dropped until input opens.
            Phase::Revealing | Phase::Evaluating => {}

            Phase::AwaitingInput => {
                let n = play.session.display_cards().len();
                let cols = current_grid_cols(n);
                match key {
                    KeyCode::Left | KeyCode::Char('h') => {
                        play.cursor = play.cursor.saturating_sub(1);
                        *dirty = true;
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        play.cursor = (play.cursor + 1).min(n.saturating_sub(1));
                        *dirty = true;
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        play.cursor = play.cursor.saturating_sub(cols);
                        *dirty = true;
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        if play.cursor + cols < n {
                            play.cursor += cols;
                            *dirty = true;
                        }
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        let flash = Duration::from_millis(config.timing.tap_flash_ms);
                        if play.last_tap.elapsed() >= flash {
                            play.last_tap = Instant::now();
                            let card_id = play.session.display_cards()[play.cursor].id;
                            let events = play.session.submit_selection(card_id, scores);
                            apply_events(play, &events, config, sound);
                            *dirty = true;
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

// ── Timers ──

fn tick_play_timers(
    play: &mut PlayState,
    config: &GameConfig,
    sound: Option<&SoundEngine>,
    dirty: &mut bool,
) {
    let now = Instant::now();

    if let Some(until) = play.banner_until {
        if now >= until {
            play.banner = None;
            play.banner_until = None;
            *dirty = true;
        }
    }

    if play.session.phase() != Phase::Revealing {
        return;
    }

    match play.reveal {
        RevealTimer::Showing { until } if now >= until => {
            let gap = config.timing.reveal_gap_ms;
            if gap > 0 {
                play.reveal = RevealTimer::Gap {
                    until: now + Duration::from_millis(gap),
                };
                *dirty = true; // blank flip frame
            } else {
                let events = play.session.advance_reveal();
                apply_events(play, &events, config, sound);
                *dirty = true;
            }
        }
        RevealTimer::Gap { until } if now >= until => {
            let events = play.session.advance_reveal();
            apply_events(play, &events, config, sound);
            *dirty = true;
        }
        _ => {}
    }
}

// ── Event reactions ──

fn apply_events(
    play: &mut PlayState,
    events: &[GameEvent],
    config: &GameConfig,
    sound: Option<&SoundEngine>,
) {
    for event in events {
        match *event {
            GameEvent::RoundStarted { .. } => {}
            GameEvent::CardShown { index } => {
                if let Some(s) = sound {
                    s.play_reveal(index, play.session.level());
                }
                play.reveal = RevealTimer::Showing {
                    until: Instant::now() + Duration::from_millis(config.timing.reveal_ms),
                };
            }
            GameEvent::InputOpen => {
                play.reveal = RevealTimer::Idle;
                play.cursor = 0;
            }
            GameEvent::SelectionAdded { .. } => {
                if let Some(s) = sound {
                    s.play_select();
                }
            }
            GameEvent::SelectionRemoved { .. } => {
                if let Some(s) = sound {
                    s.play_deselect();
                }
            }
            GameEvent::InputIgnored => {}
            GameEvent::RoundWon { level, new_best } => {
                if let Some(s) = sound {
                    s.play_success();
                }
                let text = if new_best {
                    format!("Level {level} cleared — new best!")
                } else {
                    format!("Level {level} cleared!")
                };
                play.banner = Some(Banner { text, color: Color::Yellow });
                play.banner_until =
                    Some(Instant::now() + Duration::from_millis(config.timing.outcome_pause_ms));
            }
            GameEvent::RoundLost { level } => {
                if let Some(s) = sound {
                    s.play_failure();
                }
                play.banner = Some(Banner {
                    text: format!("Wrong order at level {level} — starting over"),
                    color: Color::Red,
                });
                play.banner_until =
                    Some(Instant::now() + Duration::from_millis(config.timing.outcome_pause_ms));
            }
        }
    }
}

// ── Rendering ──

fn current_grid_cols(count: usize) -> usize {
    let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80);
    grid_cols(count, width)
}

fn draw(renderer: &mut Renderer, screen: &Screen, scores: &ScoreStore) -> std::io::Result<()> {
    match screen {
        Screen::Title { cursor } => renderer.render_title(
            scores.best(GameMode::Classic),
            scores.best(GameMode::NBack),
            *cursor,
        ),
        Screen::Playing(play) => {
            let mode = play.session.mode();
            match play.session.phase() {
                Phase::Ready | Phase::Evaluating => renderer.render_ready(
                    mode,
                    play.session.level(),
                    scores.best(mode),
                    play.banner.as_ref().map(|b| (b.text.as_str(), b.color)),
                ),
                Phase::Revealing => {
                    let card = match play.reveal {
                        RevealTimer::Gap { .. } => None,
                        _ => play.session.current_card(),
                    };
                    renderer.render_reveal(
                        mode,
                        card,
                        play.session.reveal_index(),
                        play.session.level(),
                    )
                }
                Phase::AwaitingInput => renderer.render_input(
                    mode,
                    play.session.display_cards(),
                    play.session.selection(),
                    play.cursor,
                ),
            }
        }
    }
}
