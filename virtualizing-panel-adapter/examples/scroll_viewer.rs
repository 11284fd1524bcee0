use virtualizing_panel::{
    MemoryGenerator, MemoryHost, Orientation, PanelOptions, ScrollIntoViewAlignment, Size,
};
use virtualizing_panel_adapter::Controller;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: a framework adapter driving the panel through a controller.
    //
    // An adapter would:
    // - call layout(viewport) when the window resizes or the panel asks for it
    // - forward wheel/keyboard input to the scroll commands
    // - render the scroll bars from the viewer's pixel state
    let mut c = Controller::new(
        PanelOptions::default(),
        MemoryGenerator::new(50_000),
        MemoryHost::new(|i| Size::new(400.0, if i % 5 == 0 { 48.0 } else { 32.0 })),
    );
    let viewport = Size::new(400.0, 640.0);
    c.layout(viewport)?;
    println!("vertical={:?}", c.vertical_scroll_bar());

    for _ in 0..3 {
        c.scroll_wheel(Orientation::Vertical, 120.0)?;
        c.layout_if_needed(viewport)?;
        println!(
            "wheel: offset={:.3} bar={:?}",
            c.panel().vertical_offset(),
            c.vertical_scroll_bar()
        );
    }

    c.scroll_into_view(40_000, ScrollIntoViewAlignment::Default)?;
    c.layout(viewport)?;
    println!(
        "scroll_into_view: last_in_viewport={} refreshes={}",
        c.panel().last_item_index_in_viewport(),
        c.viewer().layout_refreshes()
    );

    c.insert_item(0)?;
    c.layout(viewport)?;
    println!(
        "after insert: items={} invalidations={}",
        c.panel().window().total_item_count,
        c.viewer().invalidations()
    );
    Ok(())
}
