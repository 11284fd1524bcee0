// Example: a long uniform list measured with the in-memory collaborators.
use virtualizing_panel::{
    MemoryGenerator, MemoryHost, Orientation, PanelOptions, ScrollIntoViewAlignment, Size,
    VirtualizingPanel,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut panel = VirtualizingPanel::new(PanelOptions::default());
    let mut generator = MemoryGenerator::new(1_000_000);
    let mut host = MemoryHost::uniform(Size::new(320.0, 24.0));
    let viewport = Size::new(320.0, 480.0);

    panel.measure(&mut generator, &mut host, viewport)?;
    panel.arrange(&mut host, viewport)?;
    println!("window={:?}", panel.window());
    println!(
        "extent={} viewport={} (lines)",
        panel.extent_height(),
        panel.viewport_height()
    );

    // Scroll by pixels: the delta is translated to a logical (line) offset.
    let target = panel.translate_pixel_delta(&host, Orientation::Vertical, 12_000.0);
    panel.set_vertical_offset(target.offset)?;
    panel.measure(&mut generator, &mut host, viewport)?;
    panel.arrange(&mut host, viewport)?;
    println!("after scroll: offset={} window={:?}", panel.vertical_offset(), panel.window());

    panel.scroll_into_view(&host, 999_999, ScrollIntoViewAlignment::Leading)?;
    panel.measure(&mut generator, &mut host, viewport)?;
    panel.arrange(&mut host, viewport)?;
    println!(
        "after scroll_into_view: offset={} last_in_viewport={}",
        panel.vertical_offset(),
        panel.last_item_index_in_viewport()
    );
    println!("generator={:?}", generator.stats());
    Ok(())
}
