// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_binding::{
    BindingContext, BindingHost, BindingId, BindingKey, BindingResult, BindingSchedule,
    BindingUpdater, DataSource, PanelId, PropertyPath, ResolvedSource, UpdateStage,
    ViewHashProvider, is_prefix,
};

const PANEL: PanelId = PanelId::new(0);
const BINDINGS_PER_ELEMENT: u32 = 2;
const ELEMENTS_PER_SOURCE: u32 = 8;

struct HashedSource(i64);

impl ViewHashProvider for HashedSource {
    fn view_hash(&self) -> i64 {
        self.0
    }
}

impl DataSource for HashedSource {
    fn as_view_hash_provider(&self) -> Option<&dyn ViewHashProvider> {
        Some(self)
    }
}

/// A flat panel: element `e` has bindings `0..BINDINGS_PER_ELEMENT`, all
/// reading source `e / ELEMENTS_PER_SOURCE`.
struct FlatHost {
    elements: u32,
    dirty: Vec<bool>,
    sources: Vec<HashedSource>,
    edits: Vec<BindingKey<u32>>,
    path: PropertyPath,
    schedule: BindingSchedule,
}

impl FlatHost {
    fn new(elements: u32) -> Self {
        let sources = elements.div_ceil(ELEMENTS_PER_SOURCE);
        Self {
            elements,
            dirty: vec![true; (elements * BINDINGS_PER_ELEMENT) as usize],
            sources: (0..sources).map(|_| HashedSource(1)).collect(),
            edits: Vec::new(),
            path: PropertyPath::parse("rows[0].title").unwrap(),
            schedule: BindingSchedule::default(),
        }
    }

    fn slot(key: BindingKey<u32>) -> usize {
        (key.element * BINDINGS_PER_ELEMENT + key.binding.index()) as usize
    }

    fn touch_all_sources(&mut self) {
        for source in &mut self.sources {
            source.0 += 1;
        }
    }
}

impl BindingHost for FlatHost {
    type Element = u32;
    type Source = u32;

    fn element_panel(&self, element: u32) -> Option<PanelId> {
        (element < self.elements).then_some(PANEL)
    }

    fn panel_name(&self, _panel: PanelId) -> &str {
        "bench"
    }

    fn process_binding_requests(&mut self, _element: u32) {}

    fn invalidate_cached_data_source(&mut self, _changed: &[u32], _removed: &[u32]) {}

    fn bound_elements(&self, out: &mut Vec<u32>) {
        out.extend(0..self.elements);
    }

    fn bound_elements_count(&self) -> usize {
        self.elements as usize
    }

    fn bindings(&self, _element: u32, out: &mut Vec<BindingId>) {
        out.extend((0..BINDINGS_PER_ELEMENT).map(BindingId::new));
    }

    fn contains_binding(&self, key: BindingKey<u32>) -> bool {
        key.element < self.elements && key.binding.index() < BINDINGS_PER_ELEMENT
    }

    fn resolve_data_source(&mut self, key: BindingKey<u32>) -> ResolvedSource<u32> {
        ResolvedSource::new(key.element / ELEMENTS_PER_SOURCE, self.path.clone())
    }

    fn data_source(&self, source: u32) -> Option<&dyn DataSource> {
        self.sources
            .get(source as usize)
            .map(|data| data as &dyn DataSource)
    }

    fn clear_changes_from_source(&mut self, _source: u32) {}

    fn drain_ui_changes(&mut self, out: &mut Vec<BindingKey<u32>>) {
        out.append(&mut self.edits);
    }

    fn is_dirty(&self, key: BindingKey<u32>) -> bool {
        self.dirty[Self::slot(key)]
    }

    fn set_dirty(&mut self, key: BindingKey<u32>, dirty: bool) {
        self.dirty[Self::slot(key)] = dirty;
    }

    fn should_process_at_stage(
        &self,
        key: BindingKey<u32>,
        stage: UpdateStage,
        source_changed: bool,
    ) -> bool {
        self.schedule
            .should_process(stage, source_changed, self.is_dirty(key))
    }

    fn update_ui(&mut self, context: &BindingContext<'_, u32, u32>) -> BindingResult {
        black_box(context.path);
        BindingResult::success()
    }

    fn update_source(&mut self, context: &BindingContext<'_, u32, u32>) -> BindingResult {
        black_box(context.path);
        BindingResult::success()
    }
}

fn settled(elements: u32) -> (FlatHost, BindingUpdater<u32, u32>) {
    let mut host = FlatHost::new(elements);
    let mut updater = BindingUpdater::new(PANEL);
    updater.update(&mut host);
    (host, updater)
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_binding");
    group.sample_size(50);

    for &elements in &[256_u32, 4_096_u32] {
        group.bench_function(format!("steady_state(n={elements})"), |b| {
            let (mut host, mut updater) = settled(elements);
            b.iter(|| black_box(updater.update(&mut host)));
        });

        group.bench_function(format!("all_sources_changed(n={elements})"), |b| {
            let (mut host, mut updater) = settled(elements);
            b.iter(|| {
                host.touch_all_sources();
                black_box(updater.update(&mut host))
            });
        });

        group.bench_function(format!("first_frame(n={elements})"), |b| {
            b.iter_batched(
                || (FlatHost::new(elements), BindingUpdater::new(PANEL)),
                |(mut host, mut updater)| black_box(updater.update(&mut host)),
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("ui_edits_every_element(n={elements})"), |b| {
            let (mut host, mut updater) = settled(elements);
            b.iter(|| {
                host.edits
                    .extend((0..elements).map(|e| BindingKey::new(e, BindingId::new(0))));
                black_box(updater.update(&mut host))
            });
        });
    }

    group.finish();
}

fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_binding_paths");

    let target = PropertyPath::parse("document.sections[12].rows[3].cells[\"total\"]").unwrap();
    let changes: Vec<PropertyPath> = (0..64)
        .map(|i| PropertyPath::parse(&format!("document.sections[{i}]")).unwrap())
        .collect();

    group.bench_function("parse", |b| {
        b.iter(|| {
            black_box(PropertyPath::parse(black_box(
                "document.sections[12].rows[3].cells[\"total\"]",
            )))
        });
    });

    group.bench_function("prefix_scan(changes=64)", |b| {
        b.iter(|| {
            black_box(
                changes
                    .iter()
                    .any(|changed| is_prefix(changed, black_box(&target))),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_update, bench_paths);
criterion_main!(benches);
