//! Demo scenario for the pagespace engine
//!
//! Binds a model and a quad over a mock spatial host, then walks the
//! engine through the interesting paths: scroll, hover, extraction and a
//! stage-extent round trip. Everything the host receives is logged.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use pagespace::{
    ElementId, Engine, HostEvent, MockHost, ModelResource, PageEvent, ResyncReason,
    SpatialHost, StageRequestState, StubElement, Vector3, WindowMetrics,
};

fn log_events(engine: &mut Engine<MockHost>) {
    for event in engine.drain_events() {
        info!(element = event.element.0, event = ?event.event, "page event");
    }
}

/// Run the scripted scenario.
pub fn run_demo() -> Result<()> {
    let window = WindowMetrics::new(1280.0, 720.0);
    let mut engine = Engine::new(MockHost::new(), window, "https://example.test/gallery");

    info!(
        ratio = engine.pixels().ratio(),
        "pixel-to-meter ratio fixed at startup"
    );

    // A 256x128 px model element, extractable, with a declared target size.
    let model_id = ElementId(1);
    let mut model_el = StubElement::new(256.0, 128.0)
        .with_attribute("extractable", "true")
        .with_attribute("extracted-size", "0.5 0.5")
        .with_attribute("rotation", "0 0 30deg");
    model_el.left = 200.0;
    model_el.top = 140.0;

    let resource = ModelResource {
        width: 1.2,
        height: 0.8,
        depth: 0.6,
        center: Vector3::ZERO,
    };
    engine.bind_model(&mut model_el, model_id, resource)?;
    log_events(&mut engine);

    // A quad sitting lower on the page.
    let quad_id = ElementId(2);
    let mut quad_el = StubElement::new(180.0, 90.0);
    quad_el.left = 600.0;
    quad_el.top = 420.0;
    engine.bind_quad(&mut quad_el, quad_id)?;
    log_events(&mut engine);

    // Scroll: both elements move up 80 px.
    model_el.top -= 80.0;
    quad_el.top -= 80.0;
    engine.resync(&mut model_el, model_id, ResyncReason::Scroll);
    engine.resync(&mut quad_el, quad_id, ResyncReason::Scroll);
    info!("scrolled 80px");

    // Hover the extractable model past the debounce window.
    engine.pointer_over(model_id, true);
    engine.tick(Duration::from_millis(300));
    info!(
        animations = engine.host().animations.len(),
        haptics = engine.host().haptics.len(),
        "hover applied"
    );

    // The user performs the extraction gesture on the model node; the host
    // reports it and the engine asks the embedder to run the extraction
    // with element access.
    engine.handle_host_event(HostEvent::ExtractionGesture {
        node: first_volume_child(&engine),
    });
    let wants_extraction = engine
        .drain_events()
        .iter()
        .any(|e| e.element == model_id && e.event == PageEvent::ExtractionRequested);
    if wants_extraction {
        engine.extract(&model_el, model_id);
        log_events(&mut engine);
    }

    if let Some((_, manifest)) = engine.host().extractions.first() {
        let pretty = serde_json::to_string_pretty(manifest)?;
        info!(manifest = %pretty, "host received extraction manifest");
    }

    // Stage extent round trip: request, grant, reposition.
    let stage_id = ElementId(3);
    let stage_el = StubElement::new(0.0, 0.0).with_attribute("extents", "top:0.6;left:40cm");
    engine.request_stage_extents(&stage_el, stage_id);
    engine.handle_host_event(HostEvent::StageExtentResult {
        state: StageRequestState::Granted,
    });
    engine.handle_host_event(HostEvent::StageChanged);
    log_events(&mut engine);

    info!(
        nodes = engine.host().node_count(),
        volume_visible = engine.host().volume_visible(),
        "scenario complete"
    );

    engine.unbind(model_id);
    engine.unbind(quad_id);
    Ok(())
}

fn first_volume_child(engine: &Engine<MockHost>) -> pagespace::NodeId {
    // A real embedder gets the node id straight from the gesture event; the
    // demo just grabs the first transform parented to the volume.
    engine
        .host()
        .volume
        .as_ref()
        .and_then(|v| v.children.first().copied())
        .unwrap_or(pagespace::NodeId(0))
}
