//! Reading-order sequencing.
//!
//! Blocks are linked into a precedence graph and ordered with Kahn's
//! algorithm. Edges only ever point from an earlier page to a later one,
//! from an earlier band to a later one, or down/right inside a band, so the
//! graph is acyclic by construction.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::model::{Block, Zone};

/// Tie-break key: page, column, top edge, id.
#[derive(Debug, Clone, PartialEq)]
struct OrderKey {
    page: u32,
    column: usize,
    top: f32,
    id: String,
    index: usize,
}

impl OrderKey {
    fn of(index: usize, block: &Block) -> Self {
        Self {
            page: block.page,
            column: block.column,
            top: block.bbox.y0,
            id: block.id.clone(),
            index,
        }
    }
}

impl Eq for OrderKey {}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.page
            .cmp(&other.page)
            .then(self.column.cmp(&other.column))
            .then(self.top.total_cmp(&other.top))
            .then_with(|| self.id.cmp(&other.id))
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Precedence graph over block indices.
#[derive(Debug, Default)]
struct Graph {
    edges: BTreeSet<(usize, usize)>,
}

impl Graph {
    fn add(&mut self, from: usize, to: usize) {
        if from != to {
            self.edges.insert((from, to));
        }
    }

    /// Connect every index in `from` to every index in `to`.
    fn connect(&mut self, from: &[usize], to: &[usize]) {
        for &a in from {
            for &b in to {
                self.add(a, b);
            }
        }
    }

    fn chain(&mut self, items: &[usize]) {
        for pair in items.windows(2) {
            self.add(pair[0], pair[1]);
        }
    }
}

/// The blocks of one page arranged for sequencing.
#[derive(Debug, Default)]
struct PageFlow {
    /// Per band: column index → blocks top to bottom
    bands: Vec<BTreeMap<usize, Vec<usize>>>,
    /// Spanning blocks, top to bottom; spanning block k follows band k
    spanning: Vec<usize>,
    /// Footnotes, read after everything else on the page
    footnotes: Vec<usize>,
}

impl PageFlow {
    fn build(blocks: &[Block], members: &[usize]) -> Self {
        let by_top = |a: &usize, b: &usize| OrderKey::of(*a, &blocks[*a]).cmp(&OrderKey::of(*b, &blocks[*b]));

        let mut spanning: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| blocks[i].spanning && blocks[i].zone != Zone::Footnote)
            .collect();
        spanning.sort_by(|&a, &b| {
            blocks[a]
                .bbox
                .y0
                .total_cmp(&blocks[b].bbox.y0)
                .then(by_top(&a, &b))
        });

        let mut footnotes: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| blocks[i].zone == Zone::Footnote)
            .collect();
        footnotes.sort_by(by_top);

        let mut bands: Vec<BTreeMap<usize, Vec<usize>>> = vec![BTreeMap::new(); spanning.len() + 1];
        for &i in members {
            let block = &blocks[i];
            if block.spanning || block.zone == Zone::Footnote {
                continue;
            }
            let band = spanning
                .iter()
                .filter(|&&s| blocks[s].bbox.y0 < block.bbox.y0)
                .count();
            bands[band].entry(block.column).or_default().push(i);
        }
        for band in &mut bands {
            for column in band.values_mut() {
                column.sort_by(by_top);
            }
        }

        Self {
            bands,
            spanning,
            footnotes,
        }
    }

    /// Add this page's edges; returns (sources, sinks) of the page.
    fn link(&self, graph: &mut Graph) -> (Vec<usize>, Vec<usize>) {
        let mut sources: Vec<usize> = Vec::new();
        let mut tails: Vec<usize> = Vec::new();

        for (k, band) in self.bands.iter().enumerate() {
            let mut previous_last: Option<usize> = None;
            let mut firsts = Vec::new();
            let mut lasts = Vec::new();
            for column in band.values() {
                graph.chain(column);
                if let (Some(&first), Some(&last)) = (column.first(), column.last()) {
                    // Left to right: a column starts after the previous one ends.
                    if let Some(prev) = previous_last {
                        graph.add(prev, first);
                    }
                    previous_last = Some(last);
                    firsts.push(first);
                    lasts.push(last);
                }
            }

            if sources.is_empty() {
                sources = firsts.clone();
            }
            if !firsts.is_empty() {
                graph.connect(&tails, &firsts);
                tails = lasts;
            }

            if let Some(&span) = self.spanning.get(k) {
                if sources.is_empty() {
                    sources.push(span);
                }
                graph.connect(&tails, &[span]);
                tails = vec![span];
            }
        }

        if let Some(&first) = self.footnotes.first() {
            graph.chain(&self.footnotes);
            if sources.is_empty() {
                sources.push(first);
            }
            graph.connect(&tails, &[first]);
            tails = self.footnotes.last().copied().into_iter().collect();
        }

        (sources, tails)
    }
}

/// Put blocks in reading order.
///
/// With `enabled` off, blocks keep the raw OCR emission order of their first
/// element.
pub fn sequence(blocks: Vec<Block>, enabled: bool) -> Vec<Block> {
    if !enabled {
        let mut blocks = blocks;
        blocks.sort_by(|a, b| a.source_index.cmp(&b.source_index).then(a.id.cmp(&b.id)));
        return blocks;
    }

    let order = topological_order(&blocks);
    let mut slots: Vec<Option<Block>> = blocks.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect()
}

/// Indices of `blocks` in reading order.
fn topological_order(blocks: &[Block]) -> Vec<usize> {
    let mut pages: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, block) in blocks.iter().enumerate() {
        pages.entry(block.page).or_default().push(i);
    }

    let mut graph = Graph::default();
    let mut previous_sinks: Vec<usize> = Vec::new();
    for members in pages.values() {
        let flow = PageFlow::build(blocks, members);
        let (sources, sinks) = flow.link(&mut graph);
        graph.connect(&previous_sinks, &sources);
        if !sinks.is_empty() {
            previous_sinks = sinks;
        }
    }

    let mut indegree = vec![0usize; blocks.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); blocks.len()];
    for &(from, to) in &graph.edges {
        successors[from].push(to);
        indegree[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<OrderKey>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(OrderKey::of(i, &blocks[i])))
        .collect();

    let mut order = Vec::with_capacity(blocks.len());
    while let Some(Reverse(key)) = ready.pop() {
        order.push(key.index);
        for &next in &successors[key.index] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push(Reverse(OrderKey::of(next, &blocks[next])));
            }
        }
    }

    if order.len() < blocks.len() {
        log::warn!(
            "Reading order left {} blocks unsequenced, appending them",
            blocks.len() - order.len()
        );
        let placed: BTreeSet<usize> = order.iter().copied().collect();
        let mut rest: Vec<OrderKey> = (0..blocks.len())
            .filter(|i| !placed.contains(i))
            .map(|i| OrderKey::of(i, &blocks[i]))
            .collect();
        rest.sort();
        order.extend(rest.into_iter().map(|k| k.index));
    }

    log::debug!(
        "Sequenced {} blocks with {} precedence edges",
        order.len(),
        graph.edges.len()
    );
    order
}
