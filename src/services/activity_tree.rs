// src/services/activity_tree.rs

use std::collections::{BTreeSet, HashMap};

use crate::models::activity::ActivityEdge;

/// Fecho de descendentes: o próprio `root_id` mais todo id alcançável
/// seguindo as ligações pai -> filho, em qualquer profundidade.
///
/// Expansão iterativa sobre uma fronteira mutável até não surgir id novo.
/// O conjunto de visitados garante o término mesmo com ciclos no banco.
pub fn descendant_closure(root_id: i32, edges: &[ActivityEdge]) -> BTreeSet<i32> {
    let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
    for edge in edges {
        if let Some(parent_id) = edge.parent_id {
            children.entry(parent_id).or_default().push(edge.id);
        }
    }

    let mut closure = BTreeSet::from([root_id]);
    let mut frontier = vec![root_id];

    while let Some(current) = frontier.pop() {
        let Some(kids) = children.get(&current) else {
            continue;
        };
        for &child in kids {
            if closure.insert(child) {
                frontier.push(child);
            }
        }
    }

    closure
}
