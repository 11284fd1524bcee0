use crate::*;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

type Panel = VirtualizingPanel<MemoryContainer>;

const VIEWPORT: Size = Size::new(100.0, 400.0);

fn uniform(count: usize, options: PanelOptions<MemoryContainer>) -> (Panel, MemoryGenerator, MemoryHost) {
    (
        Panel::new(options),
        MemoryGenerator::new(count),
        MemoryHost::uniform(Size::new(100.0, 40.0)),
    )
}

fn layout(panel: &mut Panel, generator: &mut MemoryGenerator, host: &mut MemoryHost, available: Size) {
    panel.measure(generator, host, available).unwrap();
    panel.arrange(host, available).unwrap();
}

fn realized_items(panel: &Panel) -> Vec<usize> {
    panel
        .realized_children()
        .iter()
        .map(|c| c.item_index().unwrap())
        .collect()
}

fn assert_parallel(panel: &Panel, generator: &MemoryGenerator) {
    let expected: Vec<usize> = generator.realized_items().collect();
    assert_eq!(realized_items(panel), expected);
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn first_measure_realizes_viewport_and_after_trail() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    let desired = panel.measure(&mut generator, &mut host, VIEWPORT).unwrap();

    assert_eq!(desired, Size::new(100.0, 400.0));
    let w = *panel.window();
    assert_eq!(w.visible_start, 0);
    assert_eq!(w.first_visible_child_index, 0);
    assert_eq!(w.before_trail, 0);
    assert_eq!(w.visible_count, 20);
    assert_eq!(w.after_trail, 10);
    assert_eq!(panel.items_per_page(), 10);
    assert_eq!(panel.last_item_index_in_viewport(), 9);
    assert_eq!(realized_items(&panel), (0..20).collect::<Vec<_>>());

    assert_eq!(panel.viewport_height(), 10.0);
    assert_eq!(panel.extent_height(), 100.0);
    assert_eq!(panel.viewport_width(), 100.0);
    assert_eq!(panel.viewport_pixels(), 400.0);
    assert!(!panel.is_measure_dirty());
}

#[test]
fn scrolling_moves_the_window_and_builds_a_before_trail() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.set_vertical_offset(10.0).unwrap();
    assert!(panel.is_measure_dirty());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let w = *panel.window();
    assert_eq!(w.visible_start, 10);
    assert_eq!(w.before_trail, 5);
    assert_eq!(w.visible_count, 15);
    assert_eq!(w.after_trail, 5);
    assert_eq!(w.first_visible_child_index, 5);
    assert_eq!(w.cache_start, 5);
    assert_eq!(realized_items(&panel), (5..25).collect::<Vec<_>>());
    assert_parallel(&panel, &generator);
    assert_eq!(generator.stats().removed, 10);

    // Item 5 heads the before trail at the estimated prefix.
    let first = &panel.realized_children()[0];
    assert_eq!(host.layout_slot(first), Rect::new(0.0, 200.0, 100.0, 40.0));
    assert_eq!(panel.unrealized_before(&host), 200.0);
}

#[test]
fn before_trail_is_generated_backwards() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(generator.stats().backward, 0);

    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    panel.set_vertical_offset(10.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.window().before_trail, 5);
    assert!(generator.stats().backward >= 5);
    assert_eq!(realized_items(&panel)[0], 5);
}

#[test]
fn large_uniform_list_scrolls_by_pixels() {
    let (mut panel, mut generator, mut host) = uniform(10_000, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    assert_eq!(panel.items_per_page(), 10);
    assert_eq!(panel.estimated_pixel_extent(&host), 400_000.0);
    let trails = panel.window().before_trail + panel.window().after_trail;

    let target = panel.translate_pixel_delta(&host, Orientation::Vertical, 4000.0);
    assert!(close(target.offset, 100.0));
    assert_eq!(target.unused_delta, 0.0);
    panel.set_vertical_offset(target.offset).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    assert_eq!(panel.window().visible_start_item_index(), 100);
    assert_eq!(panel.items_per_page(), 10);
    assert_eq!(panel.last_item_index_in_viewport(), 109);
    assert_eq!(panel.window().before_trail + panel.window().after_trail, trails);
    assert_eq!(panel.estimated_pixel_extent(&host), 400_000.0);
}

#[test]
fn window_always_contains_the_viewport() {
    for seed in 1..=8u64 {
        let mut rng = Lcg::new(seed);
        let count = rng.gen_range_usize(1, 300);
        let sizes: Vec<f64> = (0..count + 64).map(|_| rng.gen_range_u64(10, 90) as f64).collect();
        let mode = if rng.gen_bool() {
            VirtualizationMode::Recycling
        } else {
            VirtualizationMode::Standard
        };
        let options = PanelOptions::default().with_virtualization_mode(mode);
        let mut panel = Panel::new(options);
        let mut generator = MemoryGenerator::new(count);
        let mut host = MemoryHost::new(move |i| Size::new(100.0, sizes[i % sizes.len()]));

        for _ in 0..40 {
            match rng.gen_range_usize(0, 4) {
                0 if generator.item_count() > 1 => {
                    let index = rng.gen_range_usize(0, generator.item_count());
                    if let Some(change) = generator.remove_item(index) {
                        panel.on_items_changed(&mut generator, &mut host, change).unwrap();
                    }
                }
                1 => {
                    let index = rng.gen_range_usize(0, generator.item_count() + 1);
                    let change = generator.insert_item(index);
                    panel.on_items_changed(&mut generator, &mut host, change).unwrap();
                }
                _ => {
                    let lines = panel.window().line_count().max(1) as f64;
                    panel.set_vertical_offset(rng.gen_f64() * lines).unwrap();
                }
            }
            layout(&mut panel, &mut generator, &mut host, VIEWPORT);

            let w = *panel.window();
            assert!(w.is_consistent(), "seed {seed}: {w:?}");
            assert_parallel(&panel, &generator);
            let first = usize::try_from(w.first_visible_child_index).unwrap();
            assert_eq!(
                panel.realized_children()[first].item_index(),
                Some(w.visible_start_item_index() as usize),
                "seed {seed}"
            );
            assert!(panel.vertical_offset() >= 0.0);
        }
    }
}

#[test]
fn logical_and_pixel_offsets_round_trip() {
    let mut rng = Lcg::new(7);
    let sizes: Vec<f64> = (0..200).map(|_| rng.gen_range_u64(20, 80) as f64).collect();
    let mut panel = Panel::new(PanelOptions::default());
    let mut generator = MemoryGenerator::new(200);
    let mut host = MemoryHost::new(move |i| Size::new(100.0, sizes[i]));

    panel.set_vertical_offset(40.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    for _ in 0..200 {
        let logical = rng.gen_f64() * 199.0;
        let pixels = panel.logical_to_pixel_offset(&host, logical);
        let back = panel.pixel_to_logical_offset(&host, pixels);
        assert!(close(back, logical), "{logical} -> {pixels} -> {back}");
    }
}

#[test]
fn translation_is_memoized_until_state_changes() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let walks = panel.translation_walks();
    let a = panel.translate_pixel_delta(&host, Orientation::Vertical, 130.0);
    let b = panel.translate_pixel_delta(&host, Orientation::Vertical, 130.0);
    assert_eq!(a.offset.to_bits(), b.offset.to_bits());
    assert_eq!(panel.translation_walks(), walks + 1);

    panel.translate_pixel_delta(&host, Orientation::Vertical, 131.0);
    assert_eq!(panel.translation_walks(), walks + 2);

    // A layout pass invalidates the memo.
    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    panel.translate_pixel_delta(&host, Orientation::Vertical, 131.0);
    assert_eq!(panel.translation_walks(), walks + 3);
}

#[test]
fn extent_estimate_is_exact_when_everything_is_realized() {
    let mut rng = Lcg::new(3);
    let sizes: Vec<f64> = (0..50).map(|_| rng.gen_range_u64(20, 60) as f64).collect();
    let total: f64 = sizes.iter().sum();
    let options = PanelOptions::default().with_virtualizing(false);
    let mut panel = Panel::new(options);
    let mut generator = MemoryGenerator::new(50);
    let mut host = MemoryHost::new(move |i| Size::new(100.0, sizes[i]));

    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.realized_children().len(), 50);
    assert_eq!(panel.estimated_pixel_extent(&host), total);

    // Nothing is ever cleaned up without virtualization.
    panel.set_vertical_offset(30.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.realized_children().len(), 50);
    assert_eq!(generator.stats().removed, 0);
}

#[test]
fn extent_estimate_converges_as_lines_are_realized() {
    let mut rng = Lcg::new(11);
    let sizes: Vec<f64> = (0..50).map(|_| rng.gen_range_u64(20, 60) as f64).collect();
    let total: f64 = sizes.iter().sum();
    let spread = 40.0;
    let (mut panel, mut generator, _) = uniform(50, PanelOptions::default());
    let item_sizes = sizes.clone();
    let mut host = MemoryHost::new(move |i| Size::new(100.0, item_sizes[i]));

    let mut last_realized = 0;
    let mut errors = Vec::new();
    for height in [100.0, 300.0, 600.0, 1000.0, 1500.0, 2200.0, 3000.0, 4000.0] {
        layout(&mut panel, &mut generator, &mut host, Size::new(100.0, height));
        let realized = realized_items(&panel);
        assert_eq!(realized, (0..realized.len()).collect::<Vec<_>>());
        assert!(realized.len() >= last_realized);
        last_realized = realized.len();

        // Unrealized lines are each off by at most the size spread.
        let error = (panel.estimated_pixel_extent(&host) - total).abs();
        assert!(error <= spread * (50 - realized.len()) as f64 + 1e-9);
        errors.push(error);
    }

    assert_eq!(last_realized, 50);
    assert_eq!(panel.estimated_pixel_extent(&host), total);
    let n = errors.len();
    assert_eq!(errors[n - 1], 0.0);
    assert_eq!(errors[n - 2], 0.0);
}

#[test]
fn uniform_extent_estimate_holds_for_any_window() {
    let (mut panel, mut generator, mut host) = uniform(500, PanelOptions::default());
    for offset in [0.0, 3.5, 120.0, 490.0] {
        panel.set_vertical_offset(offset).unwrap();
        layout(&mut panel, &mut generator, &mut host, VIEWPORT);
        assert_eq!(panel.estimated_pixel_extent(&host), 20_000.0);
    }
}

#[test]
fn protected_containers_are_never_recycled() {
    let options = PanelOptions::default()
        .with_virtualization_mode(VirtualizationMode::Recycling)
        .with_on_cleanup_virtualized_item(Some(
            |args: &mut CleanupVirtualizedItem<'_, MemoryContainer>| {
                if args.item_index == 17 {
                    args.cancel = true;
                }
            },
        ));
    let (mut panel, mut generator, mut host) = uniform(100, options);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let focused = generator.container_for(2).unwrap().clone();
    let dragged = generator.container_for(15).unwrap().clone();
    let vetoed = generator.container_for(17).unwrap().clone();
    host.set_focus(Some(&focused));
    host.set_drag_owner(Some(&dragged));

    panel.set_vertical_offset(50.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    assert_eq!(focused.item_index(), Some(2));
    assert_eq!(dragged.item_index(), Some(15));
    assert_eq!(vetoed.item_index(), Some(17));
    let items = realized_items(&panel);
    // The focused container keeps its neighbours too.
    assert_eq!(&items[..5], &[1, 2, 3, 15, 17]);
    assert_eq!(items[5], 45);
    assert_parallel(&panel, &generator);
    assert_eq!(generator.stats().reused, 15);
    assert_eq!(generator.pooled(), 0);

    // Kept containers outside the window are parked off-screen.
    let slot = host.layout_slot(&focused);
    assert_eq!((slot.x, slot.y), (-10000.0, -10000.0));
}

#[test]
fn recycling_reuses_containers_in_one_call_per_run() {
    let options = PanelOptions::default().with_virtualization_mode(VirtualizationMode::Recycling);
    let (mut panel, mut generator, mut host) = uniform(100, options);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.set_vertical_offset(10.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let stats = generator.stats();
    assert_eq!(stats.recycle_calls, 1);
    assert_eq!(stats.recycled, 10);
    assert_eq!(stats.reused, 10);
    assert_eq!(stats.created, 20);
    assert_eq!(generator.pooled(), 0);
    assert_eq!(panel.children().len(), 20);
    assert_eq!(realized_items(&panel), (5..25).collect::<Vec<_>>());
}

#[test]
fn own_containers_are_kept() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    generator.mark_own_container(0);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.set_vertical_offset(50.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(realized_items(&panel)[0], 0);
    assert_eq!(realized_items(&panel)[1], 45);
}

#[test]
fn removing_a_visible_item_keeps_the_focused_container() {
    let options = PanelOptions::default().with_precache_window(0.0);
    let (mut panel, mut generator, mut host) = uniform(100, options);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(realized_items(&panel), (0..11).collect::<Vec<_>>());

    let focused = generator.container_for(7).unwrap().clone();
    host.set_focus(Some(&focused));

    let change = generator.remove_item(5).unwrap();
    assert_eq!(change.container_count, 1);
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();

    assert_eq!(panel.window().first_visible_child_index, 0);
    assert_eq!(panel.window().visible_count, 10);
    assert!(panel.realized_children().contains(&focused));
    assert_eq!(focused.item_index(), Some(6));
    assert_parallel(&panel, &generator);
    assert!(panel.is_measure_dirty());

    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert!(panel.realized_children().contains(&focused));
    assert_parallel(&panel, &generator);
}

#[test]
fn removing_a_before_trail_item_shifts_the_first_visible_child() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    panel.set_vertical_offset(10.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.window().first_visible_child_index, 5);

    let change = generator.remove_item(7).unwrap();
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();

    assert_eq!(panel.window().first_visible_child_index, 4);
    assert_eq!(panel.window().before_trail, 4);
    assert_eq!(panel.window().visible_count, 15);
    assert_eq!(panel.window().total_item_count, 99);
    assert!(panel.window().is_consistent());
    assert_parallel(&panel, &generator);
}

#[test]
fn insert_past_the_window_is_not_realized() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    let w = *panel.window();
    let created = generator.stats().created;

    let change = generator.insert_item(w.cache_end());
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();

    assert_eq!(generator.stats().created, created);
    assert_eq!(panel.window().after_trail, w.after_trail);
    assert_eq!(panel.window().visible_count, w.visible_count);
    assert_eq!(panel.window().total_item_count, 101);
}

#[test]
fn insert_inside_the_viewport_grows_the_after_trail() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    let w = *panel.window();

    let change = generator.insert_item(3);
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();

    assert_eq!(panel.window().visible_count, w.visible_count + 1);
    assert_eq!(panel.window().after_trail, w.after_trail + 1);
    assert_eq!(panel.realized_children()[3].item_index(), Some(3));
    assert_eq!(host.desired_size(&panel.realized_children()[3]), Size::new(100.0, 40.0));
    assert_parallel(&panel, &generator);
}

#[test]
fn insert_inside_the_after_trail_is_realized() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    let w = *panel.window();
    assert_eq!(w.items_per_page(), 10);
    let created = generator.stats().created;

    let change = generator.insert_item(12);
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();

    assert_eq!(generator.stats().created, created + 1);
    assert_eq!(panel.window().visible_count, w.visible_count + 1);
    assert_eq!(panel.window().after_trail, w.after_trail + 1);
    assert_eq!(panel.items_per_page(), 10);
    assert_eq!(realized_items(&panel), (0..21).collect::<Vec<_>>());
    assert_eq!(panel.window().cache_end(), 21);
    assert_parallel(&panel, &generator);
}

#[test]
fn insert_into_an_empty_panel_realizes_it() {
    let (mut panel, mut generator, mut host) = uniform(0, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert!(panel.children().is_empty());
    assert_eq!(panel.window().first_visible_child_index, -1);

    let change = generator.insert_item(0);
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();
    assert_eq!(realized_items(&panel), vec![0]);
    assert_eq!(panel.window().visible_count, 1);
    assert_eq!(panel.window().after_trail, 0);
    assert_eq!(panel.window().first_visible_child_index, 0);
}

#[test]
fn replace_keeps_the_window() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    let w = *panel.window();
    let container = panel.realized_children()[3].clone();

    let change = generator.replace_item(3).unwrap();
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();

    assert_eq!(panel.realized_children()[3], container);
    assert_eq!(panel.window().visible_count, w.visible_count);
    assert_eq!(panel.window().after_trail, w.after_trail);
    assert_eq!(panel.window().first_visible_child_index, w.first_visible_child_index);
    assert_parallel(&panel, &generator);

    // Replacing an unrealized item changes nothing.
    let change = generator.replace_item(90).unwrap();
    assert_eq!(change.container_count, 0);
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();
    assert_eq!(panel.realized_children().len(), 20);
}

#[test]
fn reset_clears_everything() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    panel.set_vertical_offset(10.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let change = generator.reset_items(50);
    panel.on_items_changed(&mut generator, &mut host, change).unwrap();
    assert!(panel.children().is_empty());
    assert_eq!(panel.window().visible_start, -1);
    assert_eq!(panel.window().first_visible_child_index, -1);
    assert_eq!(panel.window().visible_count, 0);
    assert_eq!(panel.window().total_item_count, 50);
    assert_eq!(panel.scroll_data().max_desired_size, Size::ZERO);

    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.window().visible_start, 10);
    assert_eq!(panel.extent_height(), 50.0);
    assert_parallel(&panel, &generator);
}

#[test]
fn offsets_are_validated_and_clamped() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());

    // Before the first layout only the minimum applies.
    panel.set_vertical_offset(500.0).unwrap();
    assert_eq!(panel.vertical_offset(), 500.0);
    panel.set_vertical_offset(-3.0).unwrap();
    assert_eq!(panel.vertical_offset(), 0.0);

    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    panel.set_vertical_offset(500.0).unwrap();
    assert_eq!(panel.vertical_offset(), 90.0);

    let err = panel.set_vertical_offset(f64::NAN).unwrap_err();
    assert!(err.0.is_nan());
    let err: Error<MemoryError, MemoryError> = err.into();
    assert!(matches!(err, Error::InvalidOffset(v) if v.is_nan()));

    // The cross axis fits, so there is nothing to scroll.
    panel.set_horizontal_offset(30.0).unwrap();
    assert_eq!(panel.horizontal_offset(), 0.0);
}

#[test]
fn item_based_scrolling_floors_offsets() {
    let options = PanelOptions::default().with_item_based_scrolling(true);
    let (mut panel, mut generator, mut host) = uniform(100, options);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.set_vertical_offset(3.7).unwrap();
    assert_eq!(panel.vertical_offset(), 3.0);
}

#[test]
fn offset_changes_are_ignored_during_measure() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.in_measure = true;
    panel.set_vertical_offset(20.0).unwrap();
    assert_eq!(panel.vertical_offset(), 0.0);

    // A nested measure does no work.
    let calls = host.measure_calls();
    let desired = panel.measure(&mut generator, &mut host, VIEWPORT).unwrap();
    assert_eq!(desired, panel.desired_size());
    assert_eq!(host.measure_calls(), calls);
    panel.in_measure = false;
}

#[test]
fn line_page_and_wheel_commands() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.line_down(&host).unwrap();
    assert!(close(panel.vertical_offset(), 0.4));
    panel.line_up(&host).unwrap();
    assert!(close(panel.vertical_offset(), 0.0));

    // One notch moves max(16, 15% of 400) = 60 pixels.
    panel.mouse_wheel_down(&host).unwrap();
    assert!(close(panel.vertical_offset(), 1.5));
    panel.mouse_wheel_up(&host).unwrap();
    assert!(close(panel.vertical_offset(), 0.0));

    panel.page_down().unwrap();
    assert_eq!(panel.vertical_offset(), 10.0);
    panel.page_up().unwrap();
    assert_eq!(panel.vertical_offset(), 0.0);

    panel.line_right(&host).unwrap();
    assert_eq!(panel.horizontal_offset(), 0.0);

    assert!(panel.scroll_wheel(&host, Orientation::Vertical, f64::NAN).is_err());
}

#[test]
fn wheel_on_a_wide_cross_axis_moves_pixels() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    host.set_item_size(|_| Size::new(300.0, 40.0));
    panel.set_can_scroll(true, true);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.extent_width(), 300.0);

    panel.mouse_wheel_right(&host).unwrap();
    // max(16, 15% of 100) = 16 pixels.
    assert_eq!(panel.horizontal_offset(), 16.0);
    panel.mouse_wheel_left(&host).unwrap();
    assert_eq!(panel.horizontal_offset(), 0.0);
}

#[test]
fn scroll_into_view_leading_and_default() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    // Already visible.
    panel.scroll_into_view(&host, 5, ScrollIntoViewAlignment::Default).unwrap();
    assert_eq!(panel.vertical_offset(), 0.0);

    // Realized: the offset is computed from the realized sizes.
    panel.scroll_into_view(&host, 15, ScrollIntoViewAlignment::Default).unwrap();
    assert!(close(panel.vertical_offset(), 6.0));
    assert_eq!(panel.pending_scroll_into_view(), None);

    panel.scroll_into_view(&host, 30, ScrollIntoViewAlignment::Leading).unwrap();
    assert_eq!(panel.vertical_offset(), 30.0);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.window().visible_start, 30);

    // Before the viewport.
    panel.scroll_into_view(&host, 12, ScrollIntoViewAlignment::Default).unwrap();
    assert_eq!(panel.vertical_offset(), 12.0);
}

#[test]
fn scroll_into_view_far_away_is_corrected_by_measure() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.scroll_into_view(&host, 80, ScrollIntoViewAlignment::Default).unwrap();
    assert_eq!(panel.pending_scroll_into_view(), Some(80));
    assert!(panel.is_measure_dirty());

    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.pending_scroll_into_view(), None);
    assert!(close(panel.vertical_offset(), 71.0));
    assert_eq!(panel.last_item_index_in_viewport(), 80);
    assert_parallel(&panel, &generator);
}

#[test]
fn a_later_offset_change_cancels_scroll_into_view() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.scroll_into_view(&host, 80, ScrollIntoViewAlignment::Default).unwrap();
    panel.set_vertical_offset(40.0).unwrap();
    assert_eq!(panel.pending_scroll_into_view(), None);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.window().visible_start, 40);
}

#[test]
fn make_visible_scrolls_the_minimum_or_aligns() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let container = generator.container_for(15).unwrap().clone();
    let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
    let shown = panel
        .make_visible(&host, &container, rect, AlignmentRatios::default(), Point::ZERO)
        .unwrap();
    assert!(close(panel.vertical_offset(), 6.0));
    assert!(close(shown.y, 360.0));
    assert_eq!(shown.x, 0.0);
    assert_eq!(shown.size(), Size::new(100.0, 40.0));

    let leading = AlignmentRatios {
        horizontal: None,
        vertical: Some(0.0),
    };
    let shown = panel
        .make_visible(&host, &container, rect, leading, Point::ZERO)
        .unwrap();
    assert!(close(panel.vertical_offset(), 15.0));
    assert!(close(shown.y, 0.0));
}

#[test]
fn make_visible_ignores_containers_outside_the_window() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    let container = generator.container_for(0).unwrap().clone();

    panel.set_vertical_offset(50.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let shown = panel
        .make_visible(
            &host,
            &container,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            AlignmentRatios::default(),
            Point::ZERO,
        )
        .unwrap();
    assert_eq!(shown, Rect::EMPTY);
    assert_eq!(panel.vertical_offset(), 50.0);
}

#[test]
fn failed_measure_leaves_the_window_untouched() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    let before = *panel.window();
    let scroll = panel.scroll_data().snapshot();

    panel.set_vertical_offset(10.0).unwrap();
    host.fail_measure_at(Some(22));
    let err = panel.measure(&mut generator, &mut host, VIEWPORT).unwrap_err();
    assert!(err.is_layout());
    assert!(matches!(err, Error::Layout(MemoryError::MeasureFailed { index: 22 })));

    let w = *panel.window();
    assert_eq!(w.visible_start, before.visible_start);
    assert_eq!(w.visible_count, before.visible_count);
    assert_eq!(w.after_trail, before.after_trail);
    assert_eq!(w.cache_start, before.cache_start);
    assert_eq!(panel.scroll_data().extent, scroll.extent);
    assert_eq!(panel.scroll_data().viewport, scroll.viewport);
    assert_eq!(panel.vertical_offset(), 10.0);
    assert!(panel.is_measure_dirty());

    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.window().visible_start, 10);
    assert_eq!(panel.window().before_trail, 5);
    assert_eq!(panel.items_per_page(), 10);
    assert_eq!(realized_items(&panel), (5..25).collect::<Vec<_>>());
}

#[test]
fn failed_generation_surfaces_as_generator_error() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    generator.fail_generation_at(Some(4));
    let err = panel.measure(&mut generator, &mut host, VIEWPORT).unwrap_err();
    assert!(err.is_generator());
    assert_eq!(panel.window().visible_count, 0);

    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(panel.items_per_page(), 10);
}

#[test]
fn fit_items_per_line_wraps_into_lines() {
    let options = PanelOptions::default().with_items_per_line(ItemsPerLine::Fit { max: 8 });
    let mut panel = Panel::new(options);
    let mut generator = MemoryGenerator::new(100);
    let mut host = MemoryHost::uniform(Size::new(50.0, 40.0));
    let available = Size::new(200.0, 400.0);

    layout(&mut panel, &mut generator, &mut host, available);
    assert_eq!(panel.window().items_per_line, 4);
    assert_eq!(panel.window().line_count(), 25);
    assert_eq!(panel.extent_height(), 25.0);
    assert_eq!(panel.items_per_page(), 40);
    assert_eq!(panel.last_item_index_in_viewport(), 39);

    let fifth = &panel.realized_children()[5];
    assert_eq!(host.layout_slot(fifth), Rect::new(50.0, 40.0, 50.0, 40.0));

    panel.set_vertical_offset(5.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, available);
    assert_eq!(panel.window().visible_start_item_index(), 20);
    assert_parallel(&panel, &generator);
}

#[test]
fn fixed_items_per_line_is_never_zero() {
    assert_eq!(ItemsPerLine::Fixed(0).resolve(100.0, 10.0), 1);
    assert_eq!(ItemsPerLine::Fit { max: 3 }.resolve(100.0, 10.0), 3);
    assert_eq!(ItemsPerLine::Fit { max: 3 }.resolve(f64::INFINITY, 10.0), 1);
    assert_eq!(ItemsPerLine::Fit { max: 3 }.resolve(100.0, 0.0), 1);
}

#[test]
fn horizontal_panels_stack_along_x() {
    let options = PanelOptions::new(Orientation::Horizontal);
    let mut panel = Panel::new(options);
    let mut generator = MemoryGenerator::new(100);
    let mut host = MemoryHost::uniform(Size::new(40.0, 30.0));
    let available = Size::new(400.0, 30.0);

    layout(&mut panel, &mut generator, &mut host, available);
    assert_eq!(panel.extent_width(), 100.0);
    assert_eq!(panel.viewport_width(), 10.0);
    assert_eq!(panel.viewport_height(), 30.0);

    let third = &panel.realized_children()[2];
    assert_eq!(host.layout_slot(third), Rect::new(80.0, 0.0, 40.0, 30.0));

    panel.mouse_wheel_down(&host).unwrap();
    assert_eq!(panel.horizontal_offset(), 0.0);
    panel.mouse_wheel_right(&host).unwrap();
    assert!(close(panel.horizontal_offset(), 1.5));
}

#[test]
fn regular_snap_points_follow_the_first_child() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let options = PanelOptions::default()
        .with_regular_snap_points(false, true)
        .with_margin(Thickness {
            left: 0.0,
            top: 5.0,
            right: 0.0,
            bottom: 7.0,
        })
        .with_on_snap_points_changed(Some(move |orientation| {
            assert_eq!(orientation, Orientation::Vertical);
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    let (mut panel, mut generator, mut host) = uniform(100, options);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let near = panel
        .regular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Near)
        .unwrap();
    assert_eq!(near, RegularSnapPoints { offset: 5.0, interval: 40.0 });
    let center = panel
        .regular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Center)
        .unwrap();
    assert_eq!(center.offset, 25.0);
    let far = panel
        .regular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Far)
        .unwrap();
    assert_eq!(far.offset, 7.0);
    assert_eq!(
        panel.regular_snap_points(&host, Orientation::Horizontal, SnapPointsAlignment::Near),
        Ok(RegularSnapPoints::default())
    );
    assert_eq!(
        panel.irregular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Near),
        Err(SnapPointsMismatch { requested_regular: false })
    );

    // Same keys: nothing to report.
    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    host.set_item_size(|_| Size::new(100.0, 50.0));
    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    // Fires once until the keys are read again.
    host.set_item_size(|_| Size::new(100.0, 60.0));
    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    panel
        .regular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Near)
        .unwrap();
    host.set_item_size(|_| Size::new(100.0, 40.0));
    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[test]
fn irregular_snap_points_walk_the_window() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let options = PanelOptions::default()
        .with_margin(Thickness {
            left: 0.0,
            top: 5.0,
            right: 0.0,
            bottom: 0.0,
        })
        .with_on_snap_points_changed(Some(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    let (mut panel, mut generator, mut host) = uniform(100, options);
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    let near = panel
        .irregular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Near)
        .unwrap();
    assert_eq!(near.len(), 20);
    assert_eq!(&near[..3], &[0.0, 45.0, 85.0]);

    let far = panel
        .irregular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Far)
        .unwrap();
    assert_eq!(&far[..2], &[45.0, 85.0]);

    assert_eq!(
        panel.regular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Near),
        Err(SnapPointsMismatch { requested_regular: true })
    );
    assert!(
        panel
            .irregular_snap_points(&host, Orientation::Horizontal, SnapPointsAlignment::Near)
            .unwrap()
            .is_empty()
    );

    // Same keys: nothing to report.
    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    // Scrolled: the window moved, and keys start at the estimated prefix.
    panel.set_vertical_offset(10.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    let near = panel
        .irregular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Near)
        .unwrap();
    assert_eq!(near[0], 200.0);
    assert_eq!(near[1], 245.0);

    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    let again = panel
        .irregular_snap_points(&host, Orientation::Vertical, SnapPointsAlignment::Near)
        .unwrap();
    assert_eq!(again, near);

    // Resized items move the keys; fires once until they are read again.
    host.set_item_size(|_| Size::new(100.0, 50.0));
    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 2);
    host.set_item_size(|_| Size::new(100.0, 60.0));
    panel.invalidate_measure();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[test]
fn state_snapshot_restores_offsets() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    panel.set_vertical_offset(10.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);
    let state = panel.state();
    assert_eq!(state.window, *panel.window());
    assert_eq!(state.scroll.offset, Point::new(0.0, 10.0));

    let (mut restored, mut generator, mut host) = uniform(100, PanelOptions::default());
    restored.restore_offset(&state).unwrap();
    layout(&mut restored, &mut generator, &mut host, VIEWPORT);
    assert_eq!(restored.window().visible_start, 10);
    assert_eq!(restored.window().before_trail, state.window.before_trail);
}

#[test]
fn options_changes_reset_published_values() {
    let (mut panel, mut generator, mut host) = uniform(100, PanelOptions::default());
    panel.set_vertical_offset(10.0).unwrap();
    layout(&mut panel, &mut generator, &mut host, VIEWPORT);

    panel.update_options(|o| o.line_delta = 32.0);
    assert_eq!(panel.vertical_offset(), 10.0);
    assert!(panel.is_measure_dirty());

    panel.update_options(|o| o.orientation = Orientation::Horizontal);
    assert_eq!(panel.vertical_offset(), 0.0);
    assert_eq!(panel.scroll_data().extent, Size::ZERO);
}

#[test]
fn empty_collection_measures_to_nothing() {
    let (mut panel, mut generator, mut host) = uniform(0, PanelOptions::default());
    let desired = panel.measure(&mut generator, &mut host, VIEWPORT).unwrap();
    assert_eq!(desired.height, 0.0);
    assert_eq!(panel.extent_height(), 0.0);
    assert_eq!(panel.window().visible_start, -1);
    assert_eq!(panel.estimated_pixel_extent(&host), 0.0);
    panel.arrange(&mut host, VIEWPORT).unwrap();
}
