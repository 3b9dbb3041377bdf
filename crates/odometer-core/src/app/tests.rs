use std::{cell::RefCell, convert::Infallible, rc::Rc};

use embassy_futures::block_on;
use max7219::FrameBuffer;

use super::*;
use crate::{
    animation::AnimationConfig,
    font::Font,
    format::{format_counter, is_numeric_text, strip_unit, whole_km},
    render::MatrixRenderer,
    store::{RECORD_LEN, RecordError, decode_record, encode_record},
};

const MODULES: usize = 4;

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Show(FrameBuffer),
    Delay(u32),
}

type Timeline = Rc<RefCell<Vec<Event>>>;

struct RecordingSink(Timeline);

impl FrameSink for RecordingSink {
    type Error = Infallible;

    fn show(&mut self, frame: &FrameBuffer) -> Result<(), Infallible> {
        self.0.borrow_mut().push(Event::Show(frame.clone()));
        Ok(())
    }
}

struct RecordingDelay(Timeline);

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().push(Event::Delay(ns / 1_000_000));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(Event::Delay(ms));
    }
}

/// Keeps the encoded flash record in RAM so the codec is exercised end to end.
struct MemoryStore {
    record: [u8; RECORD_LEN],
    fail_save: bool,
}

impl MemoryStore {
    fn empty() -> Self {
        Self {
            record: [0xFF; RECORD_LEN],
            fail_save: false,
        }
    }

    fn holding(km: f64) -> Self {
        Self {
            record: encode_record(DistanceKm::new(km).unwrap()).unwrap(),
            fail_save: false,
        }
    }

    fn corrupt() -> Self {
        let mut store = Self::holding(120.0);
        store.record[10] ^= 0x55;
        store
    }

    fn stored(&self) -> Option<DistanceKm> {
        decode_record(&self.record).ok().flatten()
    }
}

impl DistanceStore for MemoryStore {
    type Error = RecordError;

    fn load(&mut self) -> Result<Option<DistanceKm>, RecordError> {
        decode_record(&self.record)
    }

    fn save(&mut self, distance: DistanceKm) -> Result<(), RecordError> {
        if self.fail_save {
            return Err(RecordError::Oversized);
        }
        self.record = encode_record(distance)?;
        Ok(())
    }
}

type TestApp = OdometerApp<RecordingSink, RecordingDelay, MemoryStore>;

fn make_app(store: MemoryStore) -> (TestApp, Timeline) {
    let timeline = Timeline::default();
    let renderer = MatrixRenderer::new(RecordingSink(timeline.clone()), MODULES);
    let engine = AnimationEngine::new(
        renderer,
        RecordingDelay(timeline.clone()),
        AnimationConfig::default(),
    );
    (
        OdometerApp::new(engine, store, AppConfig::default()),
        timeline,
    )
}

struct NullSink;

impl FrameSink for NullSink {
    type Error = Infallible;

    fn show(&mut self, _frame: &FrameBuffer) -> Result<(), Infallible> {
        Ok(())
    }
}

/// The frame a static `display_text(text)` is expected to produce.
fn text_frame(text: &str) -> FrameBuffer {
    let mut renderer = MatrixRenderer::new(NullSink, MODULES);
    if is_numeric_text(text) {
        renderer.draw_text(strip_unit(text).as_str(), 0, 0, Font::Large);
    } else {
        renderer.draw_text(text, 0, 0, Font::Small);
    }
    renderer.frame().clone()
}

fn km(value: f64) -> DistanceKm {
    DistanceKm::new(value).unwrap()
}

fn reading(name: &str, distance: f64) -> Result<GearReading, FetchError> {
    Ok(GearReading::new(name, km(distance)))
}

const IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 42);

/// Events after the pause that follows the IP scroll.
fn distance_phase(timeline: &Timeline) -> Vec<Event> {
    let events = timeline.borrow();
    let start = events
        .iter()
        .rposition(|event| *event == Event::Delay(1_000))
        .unwrap();
    events[start + 1..].to_vec()
}

fn shows(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::Show(_)))
        .count()
}

#[test]
fn increase_within_threshold_renders_only_final_frame() {
    let (mut app, timeline) = make_app(MemoryStore::holding(120.0));

    let presented = block_on(app.present(reading("Road Bike", 120.1), IP)).unwrap();

    assert_eq!(
        presented,
        Presented::Updated {
            distance: km(120.1),
            outcome: UpdateOutcome::Direct,
        }
    );
    assert_eq!(
        distance_phase(&timeline),
        [Event::Show(text_frame("120.1km"))]
    );
    assert_eq!(app.store().stored(), Some(km(120.1)));
}

#[test]
fn sub_kilometre_increase_above_threshold_still_animates() {
    let (mut app, timeline) = make_app(MemoryStore::holding(120.0));

    let presented = block_on(app.present(reading("Road Bike", 120.4), IP)).unwrap();

    assert_eq!(
        presented,
        Presented::Updated {
            distance: km(120.4),
            outcome: UpdateOutcome::Animated { whole_delta: 0 },
        }
    );
    let phase = distance_phase(&timeline);
    assert_eq!(phase[0], Event::Show(text_frame("+0")));
    assert_eq!(phase.last(), Some(&Event::Show(text_frame("120.4km"))));
    assert_eq!(app.store().stored(), Some(km(120.4)));
}

#[test]
fn empty_store_counts_up_from_zero() {
    let (mut app, timeline) = make_app(MemoryStore::empty());

    let presented = block_on(app.present(reading("Road Bike", 87.3), IP)).unwrap();
    assert_eq!(presented, Presented::CountedUp(km(87.3)));

    let phase = distance_phase(&timeline);
    assert_eq!(phase.len(), 100 * 2 + 1);
    for i in 0..100 {
        let expected = format_counter(whole_km(87.3 * i as f64 / 100.0));
        assert_eq!(phase[i * 2], Event::Show(text_frame(expected.as_str())), "i={i}");
        assert_eq!(phase[i * 2 + 1], Event::Delay(20));
    }
    assert_eq!(phase[200], Event::Show(text_frame("87.3km")));
    assert_eq!(app.store().stored(), Some(km(87.3)));
}

#[test]
fn notable_increase_shows_delta_then_counts_from_old_value() {
    let (mut app, timeline) = make_app(MemoryStore::holding(120.0));

    let presented = block_on(app.present(reading("Road Bike", 150.6), IP)).unwrap();
    assert_eq!(
        presented,
        Presented::Updated {
            distance: km(150.6),
            outcome: UpdateOutcome::Animated { whole_delta: 30 },
        }
    );

    let phase = distance_phase(&timeline);
    assert_eq!(phase.len(), 2 + 100 * 2 + 1);
    assert_eq!(phase[0], Event::Show(text_frame("+30")));
    assert_eq!(phase[1], Event::Delay(2_000));
    assert_eq!(phase[2], Event::Show(text_frame("0120")));
    assert_eq!(phase[202], Event::Show(text_frame("150.6km")));
}

#[test]
fn gear_name_and_ip_scroll_before_the_distance() {
    let (mut app, timeline) = make_app(MemoryStore::holding(10.0));

    block_on(app.present(reading("Bike", 10.0), IP)).unwrap();

    let events = timeline.borrow();
    let name_frames = 32 + 4 * 8;
    let ip_frames = 32 + "IP: 192.168.1.42".len() * 8;

    // Blank frame, then one show + one delay per scroll position.
    assert_eq!(events[0], Event::Show(FrameBuffer::new(MODULES)));
    assert!(
        events[1..1 + name_frames * 2]
            .chunks(2)
            .all(|pair| matches!(pair[0], Event::Show(_)) && pair[1] == Event::Delay(50))
    );
    let after_name = 1 + name_frames * 2;
    assert_eq!(events[after_name], Event::Delay(1_000));

    let ip_start = after_name + 1;
    assert_eq!(events[ip_start], Event::Show(FrameBuffer::new(MODULES)));
    let after_ip = ip_start + 1 + ip_frames * 2;
    assert_eq!(events[after_ip], Event::Delay(1_000));
    assert_eq!(shows(&events[ip_start..after_ip]), 1 + ip_frames);
}

#[test]
fn fetch_failure_falls_back_to_stored_value() {
    let (mut app, timeline) = make_app(MemoryStore::holding(120.0));

    let presented = block_on(app.present(Err(FetchError::Transport), IP)).unwrap();

    assert_eq!(presented, Presented::Stale(km(120.0)));
    assert_eq!(*timeline.borrow(), [Event::Show(text_frame("120.0km"))]);
    assert_eq!(app.store().stored(), Some(km(120.0)));
}

#[test]
fn fetch_failure_without_stored_value_shows_error() {
    let (mut app, timeline) = make_app(MemoryStore::empty());

    let presented = block_on(app.present(Err(FetchError::Status(401)), IP)).unwrap();

    assert_eq!(presented, Presented::Failed);
    assert_eq!(*timeline.borrow(), [Event::Show(text_frame(ERROR_TEXT))]);
    assert_eq!(app.store().stored(), None);
}

#[test]
fn corrupt_store_counts_up_and_is_overwritten() {
    let (mut app, _timeline) = make_app(MemoryStore::corrupt());
    assert_eq!(app.last_distance(), None);

    let presented = block_on(app.present(reading("Road Bike", 5.0), IP)).unwrap();

    assert_eq!(presented, Presented::CountedUp(km(5.0)));
    assert_eq!(app.store().stored(), Some(km(5.0)));
}

#[test]
fn failed_save_does_not_abort_presentation() {
    let mut store = MemoryStore::empty();
    store.fail_save = true;
    let (mut app, timeline) = make_app(store);

    let presented = block_on(app.present(reading("Road Bike", 1.0), IP)).unwrap();

    assert_eq!(presented, Presented::CountedUp(km(1.0)));
    assert_eq!(
        timeline.borrow().last(),
        Some(&Event::Show(text_frame("1.0km")))
    );
    assert_eq!(app.store().stored(), None);
}

#[test]
fn startup_sweep_fills_then_empties_columns() {
    let (mut app, timeline) = make_app(MemoryStore::empty());

    block_on(app.startup()).unwrap();

    let events = timeline.borrow();
    assert_eq!(shows(&events), 1 + 32 + 32);
    assert_eq!(events.len(), 1 + 32 * 2 + 1 + 32 * 2);

    let full = &events[32 * 2 - 1];
    match full {
        Event::Show(frame) => assert_eq!(frame.lit_count(), 32 * 8),
        other => panic!("expected full frame, got {other:?}"),
    }
    assert_eq!(events[32 * 2], Event::Delay(20));
    assert_eq!(events[32 * 2 + 1], Event::Delay(200));
    assert_eq!(
        events[events.len() - 2],
        Event::Show(FrameBuffer::new(MODULES))
    );
}

#[test]
fn network_failure_shows_error_text() {
    let (mut app, timeline) = make_app(MemoryStore::empty());

    app.network_failed().unwrap();

    assert_eq!(*timeline.borrow(), [Event::Show(text_frame("Error"))]);
}

#[test]
fn restart_request_gets_restart_reply() {
    let (mut app, timeline) = make_app(MemoryStore::holding(3.0));

    let reply = app.respond(b"GET /Restart HTTP/1.1\r\n\r\n").unwrap();

    assert_eq!(reply, ControlReply::Restart);
    assert!(timeline.borrow().is_empty());
}

#[test]
fn status_request_reports_stored_distance() {
    let (mut app, _timeline) = make_app(MemoryStore::holding(87.3));
    let reply = app.respond(b"GET / HTTP/1.1\r\n\r\n").unwrap();
    let body = core::str::from_utf8(reply.as_bytes()).unwrap();
    assert!(body.contains("Current Distance: 87.3km"));

    let (mut app, _timeline) = make_app(MemoryStore::corrupt());
    let reply = app.respond(b"GET / HTTP/1.1\r\n\r\n").unwrap();
    let body = core::str::from_utf8(reply.as_bytes()).unwrap();
    assert!(body.contains("Current Distance: Unknown"));
}

#[test]
fn malformed_request_is_rejected() {
    let (mut app, _timeline) = make_app(MemoryStore::empty());
    assert_eq!(app.respond(&[0xC3, 0x28]), Err(ControlError::Malformed));
}

#[test]
fn restart_announcement_scrolls_banner_then_pauses() {
    let (mut app, timeline) = make_app(MemoryStore::empty());

    block_on(app.announce_restart()).unwrap();

    let events = timeline.borrow();
    assert_eq!(shows(&events), 1 + 32 + RESTART_BANNER.len() * 8);
    assert_eq!(events.last(), Some(&Event::Delay(500)));
}

#[test]
fn plan_depends_only_on_stored_value() {
    assert_eq!(
        DistancePlan::for_reading(None, km(4.0)),
        DistancePlan::CountUp(km(4.0))
    );
    let plan = DistancePlan::for_reading(Some(km(5.0)), km(4.0));
    assert_eq!(
        plan,
        DistancePlan::Update {
            old: km(5.0),
            new: km(4.0),
        }
    );
    assert_eq!(plan.target(), km(4.0));
}
