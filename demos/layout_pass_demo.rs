//! Layout Pass Demo
//!
//! Lays out a small class diagram twice: once while the user drags a node,
//! once as a full layout pass with edge geometry memoized.
//!
//! Usage:
//!   cargo run --example layout_pass_demo
//!
//! Environment variables:
//!   GEOMETRY_CACHE_SWEEP_INTERVAL   - queries between sweeps (default: 1000)
//!   GEOMETRY_CACHE_SNAPSHOT_POLICY  - position | structural (default: structural)
//!   GEOMETRY_CACHE_START_ACTIVE     - node cache starts active (default: true)
//!   GEOMETRY_CACHE_ENABLE_METRICS   - collect statistics (default: true)

use anyhow::Result;
use diagram_geometry_cache::{
    shared, CacheConfig, Diagram, DiagramGeometryCache, DiagramType, Edge, EdgeKind, Line, Node,
    NodeKind, Point, Rectangle,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn node_bounds(node: &Node) -> Rectangle {
    let width = (node.name().len() as i32 * 8).max(100);
    Rectangle::new(node.position().x, node.position().y, width, 60)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "diagram_geometry_cache=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env()?;
    info!("Using cache configuration: {:?}", config);
    let mut caches: DiagramGeometryCache = DiagramGeometryCache::new(config);

    let diagram = Diagram::new(DiagramType::Class);
    let names = ["Customer", "Order", "OrderLine", "Product"];
    let nodes: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut node = Node::named(NodeKind::Class, *name);
            node.move_to(Point::new(i as i32 * 150, 0));
            node.attach(&diagram);
            shared(node)
        })
        .collect();

    let edges: Vec<_> = nodes
        .windows(2)
        .map(|pair| {
            let mut edge = Edge::new(EdgeKind::Aggregation);
            edge.connect(&pair[0].borrow(), &pair[1].borrow());
            edge.attach(&diagram);
            (shared(edge), pair[0].clone(), pair[1].clone())
        })
        .collect();

    info!("--- Dragging {} ---", names[1]);
    for _ in 0..20 {
        nodes[1].borrow_mut().translate(0, 5);
        for node in &nodes {
            caches.node_bounds(node, node_bounds);
        }
    }
    info!("Node cache after drag: {}", caches.nodes().stats());

    info!("--- Full layout pass ---");
    {
        let mut pass = caches.begin_layout_pass();
        for _ in 0..3 {
            for (edge, start, end) in &edges {
                let from = pass.node_bounds(start, node_bounds).center();
                let to = pass.node_bounds(end, node_bounds).center();
                let line = pass.edge_connection_points(edge, |_| Line::new(from, to));
                pass.edge_bounds(edge, |_| line.spanning_bounds());
            }
        }
        info!("Edge cache during pass: {}", pass.edges().stats());
    }

    let detached = nodes[3].clone();
    detached.borrow_mut().detach();
    let events = caches.nodes_mut().sweep();
    for event in &events {
        info!("{:?}", event);
    }

    println!("{}", serde_json::to_string_pretty(&caches.stats())?);
    Ok(())
}
