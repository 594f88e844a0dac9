// Appkeys End-to-End Scenarios
//
// Complete remapping workflows against the in-memory window system and
// sink: config text in, synthetic events out. No X server required.
//
// Run with: cargo test -p appkeys-core --test scenarios

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use appkeys_core::config::{parse_records, read_records, ConfigError};
use appkeys_core::event::{shutdown, CancellationToken, EventLoop, InputEvent};
use appkeys_core::hotkey::{Button, Hotkey, HotkeyCode};
use appkeys_core::mapping::RemapTable;
use appkeys_core::modifier::{Modifier, ModifierKeys};
use appkeys_core::output::SyntheticEvent;
use appkeys_core::remapper::Remapper;
use appkeys_core::state::ModifierState;
use appkeys_core::testing::{us_layout, FakeWindowSystem, RecordingSink, ScriptedSource};
use appkeys_core::transform::{Evaluation, RemapEngine};
use appkeys_core::window::resolve_class;
use appkeys_core::Key;

// =========================================================================
// Test Helpers
// =========================================================================

const CTRL: u8 = 37;
const ALT: u8 = 64;
const SHIFT: u8 = 50;
const T: u8 = 28;
const X: u8 = 53;

fn press(code: u8) -> InputEvent {
    InputEvent::KeyPress(Key::from(code))
}

fn release(code: u8) -> InputEvent {
    InputEvent::KeyRelease(Key::from(code))
}

fn key(code: u8, pressed: bool) -> SyntheticEvent {
    SyntheticEvent::Key {
        key: Key::from(code),
        pressed,
    }
}

/// Build a remapper from config text, focused on a window of `class`
fn remapper(config: &str, class: &str) -> (Remapper, RecordingSink) {
    let layout = us_layout();
    let records = parse_records(config, false).unwrap();
    let table = RemapTable::load(&records, &layout);
    let windows = FakeWindowSystem::new(1)
        .with_window(100, 1, Some(class))
        .with_window(101, 100, None)
        .with_focus(101);
    let sink = RecordingSink::new();
    let remapper = Remapper::new(table, layout, Box::new(windows), Box::new(sink.clone()));
    (remapper, sink)
}

fn held(remapper: &Remapper) -> [bool; 4] {
    Modifier::ALL.map(|m| remapper.tracker().is_held(m))
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn ctrl_alt_t_becomes_ctrl_alt_x_everywhere() {
    let (mut r, sink) = remapper("ctrl-alt-t * ctrl-alt-x\n", "xterm");

    r.dispatch(press(CTRL));
    r.dispatch(press(ALT));
    let before = held(&r);
    let result = r.dispatch(press(T));

    assert!(result.is_some_and(|e| e.is_remapped()));
    assert_eq!(
        sink.events(),
        vec![
            key(CTRL, false),
            key(ALT, false),
            key(CTRL, true),
            key(ALT, true),
            key(X, true),
            key(X, false),
            key(ALT, false),
            key(CTRL, false),
            key(CTRL, true),
            key(ALT, true),
        ]
    );
    assert_eq!(held(&r), before);
    assert!(r.tracker().key().is_none());

    // The physical keys go up afterwards without further output
    sink.clear();
    r.dispatch(release(T));
    r.dispatch(release(ALT));
    r.dispatch(release(CTRL));
    assert!(sink.calls().is_empty());
    assert_eq!(held(&r), [false; 4]);
}

#[test]
fn button_rule_for_other_class_produces_nothing() {
    let (mut r, sink) = remapper("b1 firefox b2\n", "chrome");

    assert_eq!(r.dispatch(InputEvent::ButtonPress(1)), None);
    assert!(sink.calls().is_empty());

    // Even an explicit evaluation of the chord misses on "chrome"
    let layout = us_layout();
    let table = RemapTable::load(&parse_records("b1 firefox b2", false).unwrap(), &layout);
    let windows = FakeWindowSystem::new(1)
        .with_window(100, 1, Some("chrome"))
        .with_focus(100);
    let mut tracker = ModifierState::new();
    tracker.press_button(Button::Button1);
    let mut engine = RemapEngine::new(ModifierKeys::from_layout(&layout));
    let mut output = RecordingSink::new();

    assert_eq!(
        engine.evaluate(&table, &mut tracker, &windows, &mut output),
        Evaluation::Miss
    );
    assert!(output.calls().is_empty());
}

#[test]
fn two_field_line_does_not_corrupt_table() {
    let config = "\
ctrl-alt-t * ctrl-alt-x
alt-q firefox
ctrl-w firefox ctrl-q
";
    let records = parse_records(config, false).unwrap();
    assert_eq!(records.len(), 2);

    let table = RemapTable::load(&records, &us_layout());
    assert_eq!(table.len(), 2);

    let ctrl_alt_t = Hotkey::from_key(Key::from(T))
        .with_modifier(Modifier::Control)
        .with_modifier(Modifier::Alt)
        .code();
    let target = table.lookup(ctrl_alt_t, "anything").unwrap();
    assert_eq!(target.key, Key::from(X));
    assert!(target.control && target.alt);

    let ctrl_w = Hotkey::from_key(Key::from(25u8))
        .with_modifier(Modifier::Control)
        .code();
    assert_eq!(table.lookup(ctrl_w, "firefox").unwrap().key, Key::from(24u8));
}

#[test]
fn two_field_line_is_fatal_in_strict_mode() {
    let result = parse_records("ctrl-alt-t * ctrl-alt-x\nalt-q firefox\n", true);
    assert!(matches!(
        result,
        Err(ConfigError::MalformedLine { line: 2, found: 2 })
    ));
}

#[test]
fn remaps_are_read_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# editor shortcuts").unwrap();
    writeln!(file, "ctrl-alt-t\t*\tctrl-alt-x").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "ctrl-w   firefox   ctrl-q").unwrap();

    let records = read_records(file.path(), true).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].class, "firefox");
}

#[test]
fn firefox_rule_wins_over_wildcard() {
    let config = "ctrl-w * ctrl-x\nctrl-w firefox ctrl-q\n";

    let (mut firefox, sink) = remapper(config, "firefox");
    firefox.dispatch(press(CTRL));
    firefox.dispatch(press(25));
    assert!(sink.events().contains(&key(24, true)));
    assert!(!sink.events().contains(&key(X, true)));

    let (mut xterm, sink) = remapper(config, "xterm");
    xterm.dispatch(press(CTRL));
    xterm.dispatch(press(25));
    assert!(sink.events().contains(&key(X, true)));
}

#[test]
fn duplicate_rule_keeps_first_target() {
    let (mut r, sink) = remapper("ctrl-w * ctrl-x\nctrl-w * ctrl-q\n", "xterm");
    r.dispatch(press(CTRL));
    r.dispatch(press(25));
    assert!(sink.events().contains(&key(X, true)));
    assert!(!sink.events().contains(&key(24, true)));
}

#[test]
fn shifted_chord_restores_shift() {
    let (mut r, sink) = remapper("shift-t * x\n", "xterm");
    r.dispatch(press(SHIFT));
    r.dispatch(press(T));
    assert_eq!(
        sink.events(),
        vec![key(SHIFT, false), key(X, true), key(X, false), key(SHIFT, true)]
    );
    assert!(r.tracker().is_held(Modifier::Shift));
}

#[test]
fn unmapped_chord_passes_through() {
    let (mut r, sink) = remapper("ctrl-alt-t * ctrl-alt-x\n", "xterm");
    r.dispatch(press(CTRL));
    assert_eq!(r.dispatch(press(X)), Some(Evaluation::Miss));
    assert!(sink.calls().is_empty());
}

#[test]
fn class_resolves_through_parent() {
    let windows = FakeWindowSystem::new(1)
        .with_window(100, 1, Some("xterm"))
        .with_window(101, 100, None);
    assert_eq!(resolve_class(&windows, 101), Some("xterm".to_string()));
}

#[test]
fn hotkey_codes_round_trip() {
    let buttons = [
        None,
        Some(Button::Button1),
        Some(Button::Button2),
        Some(Button::Button3),
    ];
    for bits in 0u8..16 {
        for button in buttons {
            for code in 0u16..=255 {
                let hotkey = Hotkey {
                    shift: bits & 0x8 != 0,
                    control: bits & 0x4 != 0,
                    alt: bits & 0x2 != 0,
                    super_: bits & 0x1 != 0,
                    key: Key::from(code),
                    button,
                };
                assert_eq!(HotkeyCode::encode(&hotkey).decode(), hotkey);
            }
        }
    }
}

#[test]
fn event_loop_runs_script_and_shuts_down() {
    let layout = us_layout();
    let records = parse_records("ctrl-alt-t * ctrl-alt-x", false).unwrap();
    let table = RemapTable::load(&records, &layout);
    let windows = FakeWindowSystem::new(1).with_window(100, 1, Some("xterm"));
    let sink = RecordingSink::new();
    let mut remapper = Remapper::new(table, layout, Box::new(windows), Box::new(sink.clone()));
    assert_eq!(remapper.register_existing_windows(), 1);

    let context = Arc::new(Mutex::new(remapper));
    let token = CancellationToken::new();
    let mut source = ScriptedSource::new([
        InputEvent::WindowCreated(100),
        press(CTRL),
        press(ALT),
        press(T),
        release(T),
        release(ALT),
        release(CTRL),
    ]);
    let control = source.control();

    let mut event_loop = EventLoop::new(Arc::clone(&context), token.clone());
    event_loop.run(&mut source).unwrap();
    assert_eq!(event_loop.dispatched(), 7);
    assert!(sink.events().contains(&key(X, true)));

    shutdown(&token, &context, &control).unwrap();
    assert!(token.is_cancelled());
    assert_eq!(control.stop_calls(), 1);
    assert_eq!(context.lock().tracker().snapshot(), Hotkey::new());
}
