//! Lowering to a device: native basis `{rz, sx, x, cz}` and linear-chain routing.
//!
//! Layout strategy:
//! - find a simple path of `n` physical qubits in the coupling map
//! - place logical qubit `i` on path position `i`
//! - when a two-qubit gate spans non-neighbouring positions, SWAP the first
//!   operand along the path until the pair is adjacent
//!
//! After routing, every gate is decomposed into the basis and consecutive RZ
//! rotations on the same qubit are merged. Decompositions hold up to global
//! phase, so measured probabilities are unchanged.

use std::collections::BTreeSet;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::circuit::builder::Circuit;
use crate::circuit::gates::{Gate, as_u_params, normalize_angle};
use crate::error::AppError;

/// Path search gives up after this many DFS expansions.
const CHAIN_SEARCH_BUDGET: usize = 200_000;

/// Native gate names accepted by the backends we target.
pub const NATIVE_BASIS: [&str; 4] = ["rz", "sx", "x", "cz"];

/// Connectivity of a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub num_qubits: usize,
    /// Undirected couplers as physical qubit pairs.
    pub coupling_map: Vec<[usize; 2]>,
}

impl Target {
    /// A line `0 - 1 - … - n−1`.
    pub fn linear(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            coupling_map: (1..num_qubits).map(|q| [q - 1, q]).collect(),
        }
    }

    fn adjacency(&self) -> Vec<BTreeSet<usize>> {
        let mut adj = vec![BTreeSet::new(); self.num_qubits];
        for &[a, b] in &self.coupling_map {
            if a < self.num_qubits && b < self.num_qubits && a != b {
                adj[a].insert(b);
                adj[b].insert(a);
            }
        }
        adj
    }
}

/// A circuit expressed on path positions `0..n`, with its physical placement.
#[derive(Debug, Clone, PartialEq)]
pub struct TranspiledCircuit {
    pub circuit: Circuit,
    /// `physical[p]` is the device qubit at path position `p`.
    pub physical: Vec<usize>,
    /// `final_layout[l]` is the path position holding logical qubit `l` at measurement.
    pub final_layout: Vec<usize>,
}

impl TranspiledCircuit {
    /// Gate count after lowering (the "transpiled depth" reported per circuit).
    pub fn gate_count(&self) -> usize {
        self.circuit.gate_count()
    }

    /// Reorder a basis index over path positions into the logical basis index.
    pub fn logical_index(&self, position_index: usize) -> usize {
        self.final_layout
            .iter()
            .enumerate()
            .fold(0, |acc, (l, &p)| acc | (((position_index >> p) & 1) << l))
    }
}

/// First simple path of `len` qubits in the coupling graph (lowest start qubit first).
pub fn find_linear_chain(target: &Target, len: usize) -> Option<Vec<usize>> {
    if len == 0 || len > target.num_qubits {
        return None;
    }
    let adj = target.adjacency();
    let mut budget = CHAIN_SEARCH_BUDGET;
    for start in 0..target.num_qubits {
        let mut path = vec![start];
        let mut used = vec![false; target.num_qubits];
        used[start] = true;
        if extend_chain(&adj, &mut path, &mut used, len, &mut budget) {
            return Some(path);
        }
        if budget == 0 {
            break;
        }
    }
    None
}

fn extend_chain(
    adj: &[BTreeSet<usize>],
    path: &mut Vec<usize>,
    used: &mut [bool],
    len: usize,
    budget: &mut usize,
) -> bool {
    if path.len() == len {
        return true;
    }
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    let Some(&last) = path.last() else {
        return false;
    };
    for &next in &adj[last] {
        if used[next] {
            continue;
        }
        used[next] = true;
        path.push(next);
        if extend_chain(adj, path, used, len, budget) {
            return true;
        }
        path.pop();
        used[next] = false;
    }
    false
}

/// Route and lower `circuit` for `target`.
pub fn transpile(circuit: &Circuit, target: &Target) -> Result<TranspiledCircuit, AppError> {
    circuit.validate()?;
    let n = circuit.num_qubits;
    let physical = find_linear_chain(target, n).ok_or_else(|| {
        AppError::config(format!(
            "Backend has no connected chain of {n} qubits in its coupling map."
        ))
    })?;

    let (routed, final_layout) = route_on_line(circuit);
    let lowered: Vec<Gate> = routed.gates.iter().flat_map(decompose).collect();
    let gates = merge_rotations(n, lowered);

    tracing::debug!(
        logical_gates = circuit.gate_count(),
        transpiled_gates = gates.len(),
        physical = ?physical,
        "circuit transpiled"
    );

    Ok(TranspiledCircuit {
        circuit: Circuit {
            num_qubits: n,
            gates,
        },
        physical,
        final_layout,
    })
}

/// Insert SWAPs so every two-qubit gate acts on neighbouring positions.
fn route_on_line(circuit: &Circuit) -> (Circuit, Vec<usize>) {
    let n = circuit.num_qubits;
    let mut layout: Vec<usize> = (0..n).collect();
    let mut occupant: Vec<usize> = (0..n).collect();
    let mut out = Circuit::new(n);

    for g in &circuit.gates {
        let qs = g.qubits();
        if qs.len() == 2 {
            let (a, b) = (qs[0], qs[1]);
            while layout[a].abs_diff(layout[b]) > 1 {
                let pa = layout[a];
                let next = if layout[b] > pa { pa + 1 } else { pa - 1 };
                let other = occupant[next];
                out.push(Gate::Swap(pa, next));
                occupant.swap(pa, next);
                layout[a] = next;
                layout[other] = pa;
            }
        }
        out.push(g.remap(|q| layout[q]));
    }
    (out, layout)
}

/// Expand one gate into `{rz, sx, x, cz}`.
pub fn decompose(gate: &Gate) -> Vec<Gate> {
    match *gate {
        Gate::H(q) => vec![Gate::Rz(q, FRAC_PI_2), Gate::Sx(q), Gate::Rz(q, FRAC_PI_2)],
        Gate::X(q) => vec![Gate::X(q)],
        Gate::Z(q) => vec![Gate::Rz(q, PI)],
        Gate::S(q) => vec![Gate::Rz(q, FRAC_PI_2)],
        Gate::Sdg(q) => vec![Gate::Rz(q, -FRAC_PI_2)],
        Gate::T(q) => vec![Gate::Rz(q, FRAC_PI_4)],
        Gate::Tdg(q) => vec![Gate::Rz(q, -FRAC_PI_4)],
        Gate::Sx(q) => vec![Gate::Sx(q)],
        // SX† = SX·X
        Gate::Sxdg(q) => vec![Gate::X(q), Gate::Sx(q)],
        Gate::Rz(q, t) => vec![Gate::Rz(q, t)],
        Gate::Rx(q, _) | Gate::Ry(q, _) | Gate::U { qubit: q, .. } => {
            let Some((theta, phi, lambda)) = as_u_params(gate) else {
                return vec![*gate];
            };
            if normalize_angle(theta).abs() < 1e-12 {
                return vec![Gate::Rz(q, phi + lambda)];
            }
            vec![
                Gate::Rz(q, lambda),
                Gate::Sx(q),
                Gate::Rz(q, theta + PI),
                Gate::Sx(q),
                Gate::Rz(q, phi + PI),
            ]
        }
        Gate::Cz(a, b) => vec![Gate::Cz(a, b)],
        Gate::Cx { control, target } => {
            let mut out = decompose(&Gate::H(target));
            out.push(Gate::Cz(control, target));
            out.extend(decompose(&Gate::H(target)));
            out
        }
        Gate::Rzz(a, b, t) => {
            let cx = Gate::Cx { control: a, target: b };
            let mut out = decompose(&cx);
            out.push(Gate::Rz(b, t));
            out.extend(decompose(&cx));
            out
        }
        Gate::Swap(a, b) => {
            let ab = Gate::Cx { control: a, target: b };
            let ba = Gate::Cx { control: b, target: a };
            [ab, ba, ab].iter().flat_map(decompose).collect()
        }
    }
}

/// Merge runs of RZ on the same qubit and drop identity rotations.
fn merge_rotations(num_qubits: usize, gates: Vec<Gate>) -> Vec<Gate> {
    let mut out: Vec<Gate> = Vec::with_capacity(gates.len());
    let mut last: Vec<Option<usize>> = vec![None; num_qubits];

    for g in gates {
        if let Gate::Rz(q, theta) = g {
            if let Some(i) = last[q] {
                if let Gate::Rz(_, prev) = out[i] {
                    out[i] = Gate::Rz(q, prev + theta);
                    continue;
                }
            }
        }
        let idx = out.len();
        for q in g.qubits() {
            last[q] = Some(idx);
        }
        out.push(g);
    }

    out.into_iter()
        .filter_map(|g| match g {
            Gate::Rz(q, theta) => {
                let t = normalize_angle(theta);
                (t.abs() > 1e-12).then_some(Gate::Rz(q, t))
            }
            other => Some(other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::builder::{OtocSpec, build_otoc};
    use crate::circuit::statevector::Statevector;
    use crate::domain::CircuitFamily;

    fn assert_same_distribution(logical: &Circuit, target: &Target) {
        let t = transpile(logical, target).unwrap();
        let expect = Statevector::from_circuit(logical).unwrap().probabilities();
        let got = Statevector::from_circuit(&t.circuit).unwrap().probabilities();
        let mut reordered = vec![0.0; got.len()];
        for (pos_idx, p) in got.iter().enumerate() {
            reordered[t.logical_index(pos_idx)] += p;
        }
        for (i, (a, b)) in expect.iter().zip(&reordered).enumerate() {
            assert!((a - b).abs() < 1e-9, "basis {i}: logical={a} transpiled={b}");
        }
    }

    #[test]
    fn transpiled_otoc_matches_logical_probabilities() {
        for family in [
            CircuitFamily::Chaotic,
            CircuitFamily::Intermediate,
            CircuitFamily::KickedIsing,
            CircuitFamily::Syk,
            CircuitFamily::Floquet,
        ] {
            let qc = build_otoc(&OtocSpec::new(family, 2, 42)).unwrap();
            assert_same_distribution(&qc, &Target::linear(4));
        }
    }

    #[test]
    fn routing_handles_long_range_gates() {
        let mut c = Circuit::new(4);
        c.push(Gate::H(0))
            .push(Gate::Ry(2, 0.7))
            .push(Gate::Cx { control: 0, target: 3 })
            .push(Gate::Rzz(3, 1, 0.4))
            .push(Gate::T(1));
        assert_same_distribution(&c, &Target::linear(6));
    }

    #[test]
    fn only_native_gates_remain() {
        let qc = build_otoc(&OtocSpec::new(CircuitFamily::Syk, 1, 3)).unwrap();
        let t = transpile(&qc, &Target::linear(4)).unwrap();
        assert!(t.circuit.gates.iter().all(|g| NATIVE_BASIS.contains(&g.name())));
    }

    #[test]
    fn chain_found_in_heavy_hex_like_graph() {
        // A ring of 6 with a dangling qubit: 0-1-2-3-4-5-0, 2-6.
        let target = Target {
            num_qubits: 7,
            coupling_map: vec![[0, 1], [1, 2], [2, 3], [3, 4], [4, 5], [5, 0], [2, 6]],
        };
        let chain = find_linear_chain(&target, 5).unwrap();
        assert_eq!(chain.len(), 5);
        for w in chain.windows(2) {
            assert!(target.coupling_map.iter().any(|&[a, b]| (a, b) == (w[0], w[1]) || (b, a) == (w[0], w[1])));
        }
    }

    #[test]
    fn disconnected_device_is_rejected() {
        let target = Target {
            num_qubits: 4,
            coupling_map: vec![[0, 1], [2, 3]],
        };
        let qc = build_otoc(&OtocSpec::new(CircuitFamily::Integrable, 1, 42)).unwrap();
        assert_eq!(transpile(&qc, &target).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn adjacent_rotations_merge() {
        let gates = merge_rotations(1, vec![Gate::Rz(0, 0.25), Gate::Rz(0, 0.5), Gate::Sx(0)]);
        assert_eq!(gates, vec![Gate::Rz(0, 0.75), Gate::Sx(0)]);
    }
}
