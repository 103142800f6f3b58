//! OpenQASM 3 serialization.

use std::fmt::Write;

use crate::circuit::builder::Circuit;
use crate::circuit::gates::Gate;
use crate::circuit::transpile::TranspiledCircuit;

/// Logical circuit on a `q` register, measured into `c`.
pub fn to_qasm3(circuit: &Circuit) -> String {
    let n = circuit.num_qubits;
    let mut out = String::new();
    header(&mut out, n);
    let _ = writeln!(out, "qubit[{n}] q;");
    for g in &circuit.gates {
        write_gate(&mut out, g, |q| format!("q[{q}]"));
    }
    let _ = writeln!(out, "c = measure q;");
    out
}

/// Device-level circuit addressing physical qubits (`$k`), as required for
/// submission to a backend.
pub fn to_qasm3_physical(t: &TranspiledCircuit) -> String {
    let n = t.circuit.num_qubits;
    let mut out = String::new();
    header(&mut out, n);
    for g in &t.circuit.gates {
        write_gate(&mut out, g, |p| format!("${}", t.physical[p]));
    }
    for (logical, &pos) in t.final_layout.iter().enumerate() {
        let _ = writeln!(out, "c[{logical}] = measure ${};", t.physical[pos]);
    }
    out
}

fn header(out: &mut String, num_clbits: usize) {
    out.push_str("OPENQASM 3.0;\n");
    out.push_str("include \"stdgates.inc\";\n");
    let _ = writeln!(out, "bit[{num_clbits}] c;");
}

fn write_gate(out: &mut String, gate: &Gate, operand: impl Fn(usize) -> String) {
    let params = gate.params();
    let _ = write!(out, "{}", gate.name());
    if !params.is_empty() {
        let joined: Vec<String> = params.iter().map(|p| format!("{p:.12}")).collect();
        let _ = write!(out, "({})", joined.join(", "));
    }
    let qubits: Vec<String> = gate.qubits().into_iter().map(operand).collect();
    let _ = writeln!(out, " {};", qubits.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::transpile::{Target, transpile};

    #[test]
    fn logical_listing() {
        let mut c = Circuit::new(2);
        c.push(Gate::H(0))
            .push(Gate::Rz(1, 0.5))
            .push(Gate::Cx { control: 0, target: 1 });
        let text = to_qasm3(&c);
        assert!(text.starts_with("OPENQASM 3.0;\n"));
        assert!(text.contains("bit[2] c;\nqubit[2] q;\n"));
        assert!(text.contains("h q[0];\n"));
        assert!(text.contains("rz(0.500000000000) q[1];\n"));
        assert!(text.contains("cx q[0], q[1];\n"));
        assert!(text.ends_with("c = measure q;\n"));
    }

    #[test]
    fn physical_listing_uses_device_qubits() {
        let mut c = Circuit::new(2);
        c.push(Gate::Cz(0, 1));
        let target = Target {
            num_qubits: 10,
            coupling_map: vec![[7, 9]],
        };
        let t = transpile(&c, &target).unwrap();
        let text = to_qasm3_physical(&t);
        assert!(text.contains("cz $7, $9;\n"));
        assert!(text.contains("c[0] = measure $7;\n"));
        assert!(text.contains("c[1] = measure $9;\n"));
    }
}
