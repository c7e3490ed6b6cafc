// SPDX-License-Identifier: MIT OR Apache-2.0
//! Link reconstruction: rebuild source links between target sockets.
//!
//! Sockets are resolved through a fixed cascade of strategies, first match
//! wins. Target socket tables are queried from the live graph, never taken
//! from a static schema.

use crate::diagnostics::{Diagnostics, Stage};
use crate::error::UnresolvedLinkError;
use crate::instantiate::Correspondence;
use crate::registry::{alias_names, input_role, output_role, primary_input, primary_output, SocketRole};
use crate::snapshot::{Snapshot, SourceLink, SourceNode, SourceNodeId};
use crate::target::{SocketInfo, TargetGraph, TargetGraphExt};
use ordoplay_shader_graph::{NodeId, PortDirection, PortType};
use std::collections::BTreeSet;
use std::fmt;

/// Socket resolution strategy, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchStrategy {
    /// Same name, case-sensitive
    Exact,
    /// Same name ignoring case
    CaseInsensitive,
    /// Alias table entry for the socket's role
    Alias,
    /// Same index, when both sides have the same socket count
    Positional,
    /// Only one target socket accepts the value type
    TypeMatch,
    /// Only one target socket matches the normalized name
    Fuzzy,
    /// Designated primary socket of the target kind
    Primary,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exact => "exact",
            Self::CaseInsensitive => "case-insensitive",
            Self::Alias => "alias",
            Self::Positional => "positional",
            Self::TypeMatch => "type",
            Self::Fuzzy => "fuzzy",
            Self::Primary => "primary",
        })
    }
}

/// A target link created for a source link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    /// The flattened source link
    pub source: SourceLink,
    /// Producer it was rebuilt from; differs from `source.from_node` when
    /// the link was rerouted around an unconvertible node
    pub producer: SourceNodeId,
    /// Target producer
    pub from_node: NodeId,
    /// Target output
    pub from_socket: String,
    /// Strategy that chose the output
    pub output_strategy: MatchStrategy,
    /// Target consumer
    pub to_node: NodeId,
    /// Target input
    pub to_socket: String,
    /// Strategy that chose the input
    pub input_strategy: MatchStrategy,
}

impl LinkRecord {
    /// `(from socket, to socket)` pair used for determinism checks
    pub fn socket_pair(&self) -> (&str, &str) {
        (&self.from_socket, &self.to_socket)
    }
}

/// Lowercase alphanumerics only
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// What the cascade needs to know about the source side of one socket
struct SourceSide<'a> {
    name: &'a str,
    key: &'a str,
    index: Option<usize>,
    count: usize,
    role: Option<SocketRole>,
}

impl<'a> SourceSide<'a> {
    fn new(node: &'a SourceNode, direction: PortDirection, key: &'a str, role: Option<SocketRole>) -> Self {
        let sockets = node.sockets(direction);
        let index = node.socket_index(direction, key);
        let name = index.map(|i| sockets[i].name.as_str()).unwrap_or(key);
        Self {
            name,
            key,
            index,
            count: sockets.len(),
            role,
        }
    }
}

/// Run the cascade over a target socket table.
///
/// `accepts` filters sockets that could take the link at all; a strategy
/// only succeeds on an accepted socket.
fn cascade(
    side: &SourceSide<'_>,
    target_kind: &str,
    sockets: &[SocketInfo],
    accepts: impl Fn(&SocketInfo) -> bool,
    typed: impl Fn(&SocketInfo) -> bool,
    primary: &[&str],
) -> Option<(String, MatchStrategy)> {
    let accepted = |name: &str| sockets.iter().find(|s| s.name == name && accepts(s));

    // 1-2: names
    for candidate in [side.name, side.key] {
        if let Some(s) = accepted(candidate) {
            return Some((s.name.clone(), MatchStrategy::Exact));
        }
    }
    for candidate in [side.name, side.key] {
        if let Some(s) = sockets
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(candidate) && accepts(s))
        {
            return Some((s.name.clone(), MatchStrategy::CaseInsensitive));
        }
    }

    // 3: alias table
    if let Some(role) = side.role {
        for alias in alias_names(target_kind, role) {
            if let Some(s) = accepted(alias) {
                return Some((s.name.clone(), MatchStrategy::Alias));
            }
        }
    }

    // 4: position, only with matching counts
    if let Some(index) = side.index {
        if side.count == sockets.len() {
            if let Some(s) = sockets.get(index).filter(|s| accepts(s)) {
                return Some((s.name.clone(), MatchStrategy::Positional));
            }
        }
    }

    // 5: single socket of a compatible type
    let mut compatible = sockets.iter().filter(|s| accepts(s) && typed(s));
    if let (Some(s), None) = (compatible.next(), compatible.next()) {
        return Some((s.name.clone(), MatchStrategy::TypeMatch));
    }

    // 6: single fuzzy name match
    let wanted = normalize(side.name);
    if wanted.len() >= 3 {
        let mut fuzzy = sockets.iter().filter(|s| {
            let have = normalize(&s.name);
            accepts(s) && !have.is_empty() && (have.contains(&wanted) || wanted.contains(&have))
        });
        if let (Some(s), None) = (fuzzy.next(), fuzzy.next()) {
            return Some((s.name.clone(), MatchStrategy::Fuzzy));
        }
    }

    // 7: designated primary socket
    primary
        .iter()
        .find_map(|name| accepted(*name))
        .map(|s| (s.name.clone(), MatchStrategy::Primary))
}

/// Resolve an output socket on a target producer
pub fn resolve_output(
    graph: &dyn TargetGraph,
    source: &SourceNode,
    key: &str,
    node: NodeId,
) -> Option<(String, MatchStrategy)> {
    let kind = graph.node_kind(node)?;
    let sockets = graph.sockets(node, PortDirection::Output);
    let side = SourceSide::new(source, PortDirection::Output, key, Some(output_role(&source.kind, key)));
    let source_type = source.output(key).map(|s| s.socket_type);
    cascade(
        &side,
        &kind,
        &sockets,
        |_| true,
        |s| source_type.is_some_and(|t| s.port_type.can_connect_to(&t)),
        primary_output(&kind),
    )
}

/// Resolve an input socket on a target consumer for a value of `value_type`
pub fn resolve_input(
    graph: &dyn TargetGraph,
    source: &SourceNode,
    key: &str,
    node: NodeId,
    value_type: PortType,
) -> Option<(String, MatchStrategy)> {
    let kind = graph.node_kind(node)?;
    let sockets = graph.sockets(node, PortDirection::Input);
    let side = SourceSide::new(source, PortDirection::Input, key, input_role(&source.kind, key));
    let primary: Vec<&str> = primary_input(&kind).into_iter().collect();
    cascade(
        &side,
        &kind,
        &sockets,
        |s| value_type.can_connect_to(&s.port_type),
        |_| true,
        &primary,
    )
}

/// Follow unconvertible producers upstream through their first linked
/// input until a converted node is found
fn convertible_producer<'s>(
    snapshot: &'s Snapshot,
    table: &Correspondence,
    link: &'s SourceLink,
) -> Option<(SourceNodeId, &'s str)> {
    let mut producer = link.from_node;
    let mut socket = link.from_socket.as_str();
    let mut visited = BTreeSet::new();

    while !table.contains(producer) {
        if !visited.insert(producer) {
            return None;
        }
        let node = snapshot.node(producer)?;
        let upstream = snapshot
            .links_into(producer)
            .min_by_key(|l| node.socket_index(PortDirection::Input, &l.to_socket).unwrap_or(usize::MAX))?;
        producer = upstream.from_node;
        socket = upstream.from_socket.as_str();
    }
    Some((producer, socket))
}

/// Whether a link into an unconvertible node survives as that node's
/// upstream, i.e. it is the first linked input and the node feeds something
fn carried_through(snapshot: &Snapshot, link: &SourceLink) -> bool {
    let Some(node) = snapshot.node(link.to_node) else { return false };
    if snapshot.links_from(link.to_node).next().is_none() {
        return false;
    }
    snapshot
        .links_into(link.to_node)
        .min_by_key(|l| node.socket_index(PortDirection::Input, &l.to_socket).unwrap_or(usize::MAX))
        .is_some_and(|first| first.to_socket == link.to_socket)
}

/// Consumer node for an input: emission inputs go to the helper when the
/// source node has one
fn consumer_node(table: &Correspondence, source: &SourceNode, key: &str) -> Option<NodeId> {
    let emission = matches!(
        input_role(&source.kind, key),
        Some(SocketRole::EmissionColor | SocketRole::EmissionStrength)
    );
    if emission {
        if let Some(helper) = table.emission_aux(source.id) {
            return Some(helper);
        }
    }
    table.primary(source.id)
}

fn endpoint(snapshot: &Snapshot, node: SourceNodeId, socket: &str) -> String {
    let name = snapshot.node(node).map(|n| n.name.as_str()).unwrap_or("?");
    format!("{name}.{socket}")
}

/// Rebuild every source link in the target graph.
///
/// Dropped links are recorded as unresolved-link diagnostics; nothing here
/// is fatal.
pub fn reconstruct(
    snapshot: &Snapshot,
    table: &Correspondence,
    graph: &mut dyn TargetGraph,
    diagnostics: &mut Diagnostics,
) -> Vec<LinkRecord> {
    let mut records = Vec::new();

    for link in snapshot.links() {
        let Some(consumer) = snapshot.node(link.to_node) else { continue };
        let unresolved = |diagnostics: &mut Diagnostics, from: SourceNodeId, from_socket: &str, reason: String| {
            diagnostics.unresolved(
                Stage::Links,
                Some(link.to_node),
                UnresolvedLinkError {
                    from: endpoint(snapshot, from, from_socket),
                    to: endpoint(snapshot, link.to_node, &link.to_socket),
                    reason,
                },
            );
        };

        if table.is_unconvertible(link.to_node) {
            if carried_through(snapshot, link) {
                tracing::trace!(node = %consumer.name, "link routed around unconvertible node");
            } else {
                unresolved(
                    diagnostics,
                    link.from_node,
                    &link.from_socket,
                    "consumer is not convertible".to_string(),
                );
            }
            continue;
        }

        let Some((producer_id, producer_socket)) = convertible_producer(snapshot, table, link) else {
            unresolved(
                diagnostics,
                link.from_node,
                &link.from_socket,
                "no convertible producer upstream".to_string(),
            );
            continue;
        };
        let (Some(producer), Some(from_node), Some(to_node)) = (
            snapshot.node(producer_id),
            table.primary(producer_id),
            consumer_node(table, consumer, &link.to_socket),
        ) else {
            continue;
        };

        let Some((from_socket, output_strategy)) =
            resolve_output(&*graph, producer, producer_socket, from_node)
        else {
            unresolved(diagnostics, producer_id, producer_socket, "no matching output socket".to_string());
            continue;
        };
        let value_type = graph
            .socket_type(from_node, PortDirection::Output, &from_socket)
            .unwrap_or(PortType::Any);

        let Some((to_socket, input_strategy)) =
            resolve_input(&*graph, consumer, &link.to_socket, to_node, value_type)
        else {
            unresolved(diagnostics, producer_id, producer_socket, "no matching input socket".to_string());
            continue;
        };

        if graph.is_linked(to_node, &to_socket) {
            unresolved(
                diagnostics,
                producer_id,
                producer_socket,
                format!("target input '{to_socket}' is already linked"),
            );
            continue;
        }
        if let Err(error) = graph.create_link(from_node, &from_socket, to_node, &to_socket) {
            unresolved(diagnostics, producer_id, producer_socket, error.to_string());
            continue;
        }

        tracing::trace!(
            from = %from_socket,
            to = %to_socket,
            %output_strategy,
            %input_strategy,
            "link rebuilt"
        );
        records.push(LinkRecord {
            source: link.clone(),
            producer: producer_id,
            from_node,
            from_socket,
            output_strategy,
            to_node,
            to_socket,
            input_strategy,
        });
    }

    tracing::info!(
        links = records.len(),
        source_links = snapshot.links().len(),
        "links rebuilt"
    );
    records
}
