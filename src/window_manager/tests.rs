use std::collections::HashMap;

use super::WindowManager;
use crate::Config;
use crate::client::{ClientId, Presentation};
use crate::display::{
    BUTTON_LEFT, ButtonEvent, ClientRequest, Event, Protocol, SignalKind, StateAction, Window,
};
use crate::geometry::Rect;
use crate::keyboard::Arg;
use crate::testing::{
    BAR_BASE, Call, FakeProcesses, FakeWindow, MockDisplay, NullRenderer, ROOT,
};

const SCREEN: Rect = Rect {
    x: 0,
    y: 0,
    width: 1000,
    height: 1000,
};

fn config() -> Config {
    Config {
        border_width: 0,
        gaps_enabled: false,
        show_bar: false,
        mfact: 0.5,
        nmaster: 1,
        resize_hints: false,
        ..Config::default()
    }
}

fn start(config: Config, processes: FakeProcesses) -> WindowManager<MockDisplay> {
    let display = MockDisplay::new(vec![SCREEN]);
    let mut wm = WindowManager::new(
        display,
        Box::new(NullRenderer::default()),
        Box::new(processes),
        config,
    )
    .expect("window manager starts");
    wm.display.take_calls();
    wm
}

fn wm() -> WindowManager<MockDisplay> {
    start(config(), FakeProcesses::default())
}

fn map(wm: &mut WindowManager<MockDisplay>, window: Window, fake: FakeWindow) -> ClientId {
    wm.display.add_window(window, fake);
    wm.handle_event(Event::MapRequest { window })
        .expect("map request handled");
    wm.window_to_client(window).expect("window is managed")
}

fn map_plain(wm: &mut WindowManager<MockDisplay>, window: Window) -> ClientId {
    map(wm, window, FakeWindow::new(Rect::new(0, 0, 100, 100)))
}

fn assert_consistent(wm: &WindowManager<MockDisplay>) {
    for monitor in &wm.monitors {
        let mut clients = monitor.clients.clone();
        let mut stack = monitor.stack.clone();
        clients.sort();
        stack.sort();
        assert_eq!(clients, stack);
        if let Some(selected) = monitor.selected {
            assert!(monitor.stack.contains(&selected));
        }
        for id in &monitor.clients {
            assert!(wm.clients.contains(*id));
        }
    }
}

#[test]
fn test_tile_three_clients() {
    let mut wm = wm();
    let first = map_plain(&mut wm, 10);
    let second = map_plain(&mut wm, 11);
    let third = map_plain(&mut wm, 12);

    assert_eq!(wm.clients[third].geometry, Rect::new(0, 0, 500, 1000));
    assert_eq!(wm.clients[second].geometry, Rect::new(500, 0, 500, 500));
    assert_eq!(wm.clients[first].geometry, Rect::new(500, 500, 500, 500));
    assert_eq!(wm.selected(), Some(third));
    assert_consistent(&wm);
}

#[test]
fn test_monocle_symbol_counts_clients() {
    let mut wm = wm();
    for window in 10..14 {
        map_plain(&mut wm, window);
    }
    let layout = wm.layout_index(&Arg::Str("monocle".to_string()));
    wm.set_layout(layout).unwrap();

    assert_eq!(wm.monitors[0].layout_symbol, "[4]");
    for (_, client) in wm.clients.iter() {
        assert_eq!(client.geometry, SCREEN);
    }
}

#[test]
fn test_rearranging_unchanged_layout_sends_no_configure() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    map_plain(&mut wm, 11);
    wm.display.take_calls();

    wm.arrange(Some(0)).unwrap();
    assert!(wm.display.configures_of(10).is_empty());
    assert!(wm.display.configures_of(11).is_empty());
}

#[test]
fn test_unmap_keeps_lists_consistent() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    let second = map_plain(&mut wm, 11);
    map_plain(&mut wm, 12);

    wm.handle_event(Event::UnmapNotify {
        window: 12,
        synthetic: false,
    })
    .unwrap();

    assert_eq!(wm.clients.len(), 2);
    assert_eq!(wm.selected(), Some(second));
    assert_consistent(&wm);
}

#[test]
fn test_synthetic_unmap_only_withdraws() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    wm.handle_event(Event::UnmapNotify {
        window: 10,
        synthetic: true,
    })
    .unwrap();
    assert_eq!(wm.clients.len(), 1);
}

#[test]
fn test_view_restores_per_tag_settings() {
    let mut wm = wm();
    wm.view(1 << 1).unwrap();
    wm.inc_nmaster(1).unwrap();
    assert_eq!(wm.monitors[0].nmaster, 2);

    wm.view(1).unwrap();
    assert_eq!(wm.monitors[0].nmaster, 1);

    wm.view(0).unwrap();
    assert_eq!(wm.monitors[0].view(), 1 << 1);
    assert_eq!(wm.monitors[0].nmaster, 2);
}

#[test]
fn test_toggle_view_to_every_tag_uses_its_own_slot() {
    let mut wm = wm();
    let every = wm.space.all();
    wm.inc_nmaster(1).unwrap();
    assert_eq!(wm.monitors[0].nmaster, 2);

    wm.toggle_view(every & !1).unwrap();
    assert_eq!(wm.monitors[0].view(), every);
    assert_eq!(wm.monitors[0].pertag.current, 0);
    assert_eq!(wm.monitors[0].nmaster, 1);
    wm.inc_nmaster(2).unwrap();

    wm.toggle_view(every & !1).unwrap();
    assert_eq!(wm.monitors[0].view(), 1);
    assert_eq!(wm.monitors[0].pertag.current, 1);
    assert_eq!(wm.monitors[0].nmaster, 2);

    wm.view(every).unwrap();
    assert_eq!(wm.monitors[0].nmaster, 3);
}

#[test]
fn test_toggle_tag_is_an_involution_and_never_empties() {
    let mut wm = wm();
    let id = map_plain(&mut wm, 10);

    wm.toggle_tag(1 << 2).unwrap();
    assert_eq!(wm.clients[id].tags, 0b101);
    wm.toggle_tag(1 << 2).unwrap();
    assert_eq!(wm.clients[id].tags, 0b001);

    wm.toggle_tag(1).unwrap();
    assert_eq!(wm.clients[id].tags, 0b001);
}

#[test]
fn test_shift_view_lands_on_occupied_tag() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    wm.tag(1 << 4).unwrap();
    assert_eq!(wm.monitors[0].view(), 1);

    wm.shift_view(1).unwrap();
    assert_eq!(wm.monitors[0].view(), 1 << 4);
}

#[test]
fn test_shift_view_without_clients_stays() {
    let mut wm = wm();
    wm.shift_view(1).unwrap();
    assert_eq!(wm.monitors[0].view(), 1);
}

#[test]
fn test_swap_tags_moves_clients_and_view() {
    let mut wm = wm();
    let here = map_plain(&mut wm, 10);
    wm.view(1 << 2).unwrap();
    let there = map_plain(&mut wm, 11);
    wm.view(1).unwrap();

    wm.swap_tags(1 << 2).unwrap();
    assert_eq!(wm.clients[here].tags, 1 << 2);
    assert_eq!(wm.clients[there].tags, 1);
    assert_eq!(wm.monitors[0].view(), 1 << 2);
}

#[test]
fn test_terminal_swallows_child_and_comes_back() {
    let processes = FakeProcesses {
        parents: HashMap::from([(200, 100)]),
        ..FakeProcesses::default()
    };
    let mut wm = start(config(), processes);
    let terminal = map(
        &mut wm,
        20,
        FakeWindow::new(Rect::new(0, 0, 300, 300))
            .class("st", "St")
            .pid(100),
    );
    wm.display.add_window(21, FakeWindow::new(Rect::new(0, 0, 50, 50)).pid(200));
    wm.handle_event(Event::MapRequest { window: 21 }).unwrap();

    assert_eq!(wm.window_to_client(21), Some(terminal));
    assert_eq!(wm.window_to_client(20), None);
    assert_eq!(wm.clients.len(), 2);
    assert_eq!(wm.monitors[0].clients, vec![terminal]);
    assert!(wm.display.calls.contains(&Call::Unmap(20)));
    assert_consistent(&wm);

    wm.display.take_calls();
    wm.handle_event(Event::DestroyNotify { window: 21 }).unwrap();

    assert_eq!(wm.clients[terminal].presentation, Presentation::Own(20));
    assert_eq!(wm.clients.len(), 1);
    assert!(wm.display.calls.contains(&Call::Map(20)));
    assert_eq!(wm.clients[terminal].geometry, SCREEN);
    assert_eq!(wm.display.configures_of(20).last(), Some(&SCREEN));
    assert_consistent(&wm);
}

fn swallowing_terminal(wm: &mut WindowManager<MockDisplay>) -> ClientId {
    let terminal = map(
        wm,
        20,
        FakeWindow::new(Rect::new(0, 0, 300, 300))
            .class("st", "St")
            .pid(100),
    );
    wm.display.add_window(21, FakeWindow::new(Rect::new(0, 0, 50, 50)).pid(200));
    wm.handle_event(Event::MapRequest { window: 21 }).unwrap();
    assert!(wm.clients[terminal].is_swallowing());
    terminal
}

#[test]
fn test_destroyed_terminal_window_leaves_child_in_place() {
    let processes = FakeProcesses {
        parents: HashMap::from([(200, 100)]),
        ..FakeProcesses::default()
    };
    let mut wm = start(config(), processes);
    let terminal = swallowing_terminal(&mut wm);
    wm.display.take_calls();

    wm.handle_event(Event::DestroyNotify { window: 20 }).unwrap();

    assert_eq!(wm.clients[terminal].presentation, Presentation::Own(21));
    assert_eq!(wm.clients[terminal].pid, 200);
    assert!(!wm.clients[terminal].is_terminal);
    assert_eq!(wm.clients.len(), 1);
    assert_eq!(wm.window_to_client(21), Some(terminal));
    assert!(!wm.display.calls.contains(&Call::Map(20)));
    assert_consistent(&wm);

    wm.handle_event(Event::DestroyNotify { window: 21 }).unwrap();
    assert!(wm.clients.is_empty());
    assert_consistent(&wm);
}

#[test]
fn test_no_swallow_for_unrelated_process() {
    let mut wm = wm();
    map(
        &mut wm,
        20,
        FakeWindow::new(Rect::new(0, 0, 300, 300))
            .class("st", "St")
            .pid(100),
    );
    map(&mut wm, 21, FakeWindow::new(Rect::new(0, 0, 50, 50)).pid(300));
    assert_eq!(wm.monitors[0].clients.len(), 2);
}

#[test]
fn test_toggle_scratch_spawns_then_hides() {
    let processes = FakeProcesses::default();
    let spawned = processes.spawned.clone();
    let mut wm = start(config(), processes);
    let scratch = wm.space.scratch_tag(0);

    wm.toggle_scratch(0).unwrap();
    assert_eq!(spawned.borrow()[0][..3], ["st", "-n", "spterm"]);
    assert_eq!(wm.monitors[0].view(), 1 | scratch);

    let id = map(
        &mut wm,
        30,
        FakeWindow::new(Rect::new(0, 0, 400, 300)).class("spterm", "St"),
    );
    assert_eq!(wm.clients[id].tags, scratch);
    assert!(wm.clients[id].is_floating);

    wm.toggle_scratch(0).unwrap();
    assert_eq!(wm.monitors[0].view(), 1);
    assert_eq!(spawned.borrow().len(), 1);
}

#[test]
fn test_hide_and_activate() {
    let mut wm = wm();
    let other = map_plain(&mut wm, 10);
    let id = map(
        &mut wm,
        11,
        FakeWindow::new(Rect::new(0, 0, 100, 100)).title("editor"),
    );

    wm.hide(1).unwrap();
    assert!(wm.clients[id].is_hidden);
    assert_eq!(wm.clients[id].name, "[HIDDEN]editor");
    assert_eq!(wm.selected(), Some(other));
    assert_eq!(wm.tiled(0), vec![other]);

    wm.handle_event(Event::ClientMessage {
        window: 11,
        request: ClientRequest::Activate,
    })
    .unwrap();
    assert!(!wm.clients[id].is_hidden);
    assert_eq!(wm.clients[id].name, "editor");
    assert_eq!(wm.selected(), Some(id));
}

#[test]
fn test_fullscreen_request_round_trip() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    let id = map_plain(&mut wm, 11);
    let tiled = wm.clients[id].geometry;

    let request = |action| Event::ClientMessage {
        window: 11,
        request: ClientRequest::Fullscreen(action),
    };
    wm.handle_event(request(StateAction::Add)).unwrap();
    assert!(wm.clients[id].is_fullscreen);
    assert_eq!(wm.clients[id].geometry, SCREEN);

    wm.handle_event(request(StateAction::Toggle)).unwrap();
    assert!(!wm.clients[id].is_fullscreen);
    assert!(!wm.clients[id].is_floating);
    assert_eq!(wm.clients[id].geometry, tiled);
}

#[test]
fn test_kill_prefers_delete_protocol() {
    let mut wm = wm();
    let mut polite = FakeWindow::new(Rect::new(0, 0, 100, 100));
    polite.protocols.push(Protocol::DeleteWindow);
    map(&mut wm, 10, polite);
    wm.display.take_calls();
    wm.kill_client().unwrap();
    assert!(wm.display.calls.contains(&Call::Protocol(10, Protocol::DeleteWindow)));

    map_plain(&mut wm, 11);
    wm.display.take_calls();
    wm.kill_client().unwrap();
    assert!(wm.display.calls.contains(&Call::Kill(11)));
}

#[test]
fn test_tag_bar_click_views_tag() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    wm.toggle_tag(1 << 2).unwrap();

    // cells: "1" at 0..30, "3" at 30..60
    wm.handle_event(Event::ButtonPress(ButtonEvent {
        window: BAR_BASE,
        x: 45,
        y: 5,
        root_x: 45,
        root_y: 5,
        button: BUTTON_LEFT,
        state: 0,
    }))
    .unwrap();
    assert_eq!(wm.monitors[0].view(), 1 << 2);
}

#[test]
fn test_push_stack_moves_selection() {
    let mut wm = wm();
    let first = map_plain(&mut wm, 10);
    let second = map_plain(&mut wm, 11);
    let third = map_plain(&mut wm, 12);
    assert_eq!(wm.monitors[0].clients, vec![third, second, first]);

    wm.push_stack(1).unwrap();
    assert_eq!(wm.monitors[0].clients, vec![second, third, first]);

    wm.push_stack(0).unwrap();
    assert_eq!(wm.monitors[0].clients, vec![third, second, first]);
}

#[test]
fn test_zoom_promotes_next_when_master_selected() {
    let mut wm = wm();
    let first = map_plain(&mut wm, 10);
    let second = map_plain(&mut wm, 11);

    wm.zoom().unwrap();
    assert_eq!(wm.monitors[0].clients, vec![first, second]);
    assert_eq!(wm.selected(), Some(first));
}

#[test]
fn test_set_mfact_rejects_out_of_range() {
    let mut wm = wm();
    wm.set_mfact(0.1).unwrap();
    assert!((wm.monitors[0].mfact - 0.6).abs() < 1e-6);
    wm.set_mfact(0.9).unwrap();
    assert!((wm.monitors[0].mfact - 0.6).abs() < 1e-6);
    wm.set_mfact(1.3).unwrap();
    assert!((wm.monitors[0].mfact - 0.3).abs() < 1e-6);
}

#[test]
fn test_second_screen_adds_monitor() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    wm.display.screens.push(Rect::new(1000, 0, 800, 600));
    wm.handle_event(Event::RootConfigured {
        width: 1800,
        height: 1000,
    })
    .unwrap();
    assert_eq!(wm.monitors.len(), 2);
    assert!(wm.monitors[1].bar_window.is_some());

    wm.display.screens.pop();
    wm.handle_event(Event::RootConfigured {
        width: 1000,
        height: 1000,
    })
    .unwrap();
    assert_eq!(wm.monitors.len(), 1);
    assert_eq!(wm.monitors[0].clients.len(), 1);
}

#[test]
fn test_terminate_signal_stops_and_cleans_up() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    wm.display.events.push_back(Event::Signal(SignalKind::Terminate));

    assert!(!wm.run().unwrap());
    assert!(wm.display.calls.contains(&Call::Cleanup));
    assert!(wm.clients.is_empty());
}

#[test]
fn test_hangup_requests_restart() {
    let mut wm = wm();
    wm.display.events.push_back(Event::Signal(SignalKind::Hangup));
    assert!(wm.run().unwrap());
}

fn release() -> Event {
    Event::ButtonRelease(ButtonEvent {
        window: ROOT,
        x: 50,
        y: 50,
        root_x: 50,
        root_y: 50,
        button: BUTTON_LEFT,
        state: 0,
    })
}

#[test]
fn test_failed_drag_step_still_releases_pointer() {
    let mut wm = wm();
    let id = map_plain(&mut wm, 10);
    wm.toggle_floating().unwrap();
    assert!(wm.clients[id].is_floating);
    wm.display.failing = Some(10);
    wm.display.take_calls();
    wm.display.events.extend([
        Event::MotionNotify {
            window: ROOT,
            root_x: 50,
            root_y: 50,
            time: 100,
        },
        release(),
    ]);

    wm.move_mouse().unwrap();

    assert!(wm.display.calls.contains(&Call::UngrabPointer));
    assert!(wm.display.events.is_empty());
}

#[test]
fn test_lost_event_stream_ends_drag_ungrabbed() {
    let mut wm = wm();
    map_plain(&mut wm, 10);
    wm.display.take_calls();

    assert!(wm.resize_mouse().is_err());
    assert_eq!(wm.display.calls.last(), Some(&Call::UngrabPointer));
}
