//! Classification of incoming edges into text and adapter dependency sets.

use super::Edge;

/// Split the edges targeting `node_id` into ordered (text, adapter) source-id lists.
///
/// Order is preserved as given in `edges`. An edge is an adapter edge when its
/// `target_handle` begins with [`Edge::ADAPTER_HANDLE_PREFIX`]; everything else,
/// including edges with no handle at all, is a text edge.
#[must_use]
pub fn classify_incoming<'a>(node_id: &str, edges: &'a [Edge]) -> (Vec<&'a str>, Vec<&'a str>) {
    let mut text_inputs = Vec::new();
    let mut adapter_inputs = Vec::new();
    for edge in edges.iter().filter(|e| e.target == node_id) {
        if edge.is_adapter() {
            adapter_inputs.push(edge.source.as_str());
        } else {
            text_inputs.push(edge.source.as_str());
        }
    }
    (text_inputs, adapter_inputs)
}
