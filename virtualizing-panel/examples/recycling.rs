// Example: recycling mode keeps a pool of containers and never recycles the focused one.
use virtualizing_panel::{
    CleanupVirtualizedItem, MemoryContainer, MemoryGenerator, MemoryHost, PanelOptions, Size,
    VirtualizationMode, VirtualizingPanel,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = PanelOptions::default()
        .with_virtualization_mode(VirtualizationMode::Recycling)
        .with_on_cleanup_virtualized_item(Some(
            |cleanup: &mut CleanupVirtualizedItem<'_, MemoryContainer>| {
                // Pretend item 7 is still animating out.
                if cleanup.item_index == 7 {
                    cleanup.cancel = true;
                }
            },
        ));
    let mut panel = VirtualizingPanel::new(options);
    let mut generator = MemoryGenerator::new(10_000);
    let mut host = MemoryHost::uniform(Size::new(200.0, 30.0));
    let viewport = Size::new(200.0, 300.0);

    panel.measure(&mut generator, &mut host, viewport)?;
    panel.arrange(&mut host, viewport)?;

    if let Some(focused) = generator.container_for(2).cloned() {
        host.set_focus(Some(&focused));
    }

    for offset in [20.0, 60.0, 200.0, 1_000.0] {
        panel.set_vertical_offset(offset)?;
        panel.measure(&mut generator, &mut host, viewport)?;
        panel.arrange(&mut host, viewport)?;
        let items: Vec<usize> = generator.realized_items().collect();
        println!(
            "offset={offset} realized={} first={:?} pooled={} stats={:?}",
            items.len(),
            &items[..items.len().min(4)],
            generator.pooled(),
            generator.stats()
        );
    }
    Ok(())
}
