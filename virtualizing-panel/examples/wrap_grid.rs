// Example: several items per line, with the line width fitted to the available size.
use virtualizing_panel::{
    ItemsPerLine, MemoryGenerator, MemoryHost, Orientation, PanelOptions, Size,
    SnapPointsAlignment, VirtualizingPanel,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = PanelOptions::default().with_items_per_line(ItemsPerLine::Fit { max: 6 });
    let mut panel = VirtualizingPanel::new(options);
    let mut generator = MemoryGenerator::new(500);
    // Every third item is taller.
    let mut host = MemoryHost::new(|i| {
        let height = if i % 3 == 0 { 90.0 } else { 60.0 };
        Size::new(120.0, height)
    });

    for width in [480.0, 720.0, 250.0] {
        let viewport = Size::new(width, 600.0);
        panel.measure(&mut generator, &mut host, viewport)?;
        panel.arrange(&mut host, viewport)?;
        println!(
            "width={width} items_per_line={} lines={} items_per_page={}",
            panel.window().items_per_line,
            panel.window().line_count(),
            panel.items_per_page()
        );
    }

    let keys = panel.irregular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Near)?;
    println!("snap points={keys:?}");
    Ok(())
}
