//! Gate set shared by the builder, simulator, transpiler and QASM writer.
//!
//! Qubit indices are logical until `transpile` maps them onto a device.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, PI};

use num_complex::Complex64;

/// A 2×2 unitary in row-major order.
pub type Matrix2 = [[Complex64; 2]; 2];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    H(usize),
    X(usize),
    Z(usize),
    S(usize),
    Sdg(usize),
    T(usize),
    Tdg(usize),
    Sx(usize),
    Sxdg(usize),
    Rx(usize, f64),
    Ry(usize, f64),
    Rz(usize, f64),
    /// Generic rotation `U(θ, φ, λ)`.
    U {
        qubit: usize,
        theta: f64,
        phi: f64,
        lambda: f64,
    },
    Cx { control: usize, target: usize },
    Cz(usize, usize),
    /// `exp(−i θ/2 Z⊗Z)`.
    Rzz(usize, usize, f64),
    Swap(usize, usize),
}

impl Gate {
    /// OpenQASM 3 / `stdgates.inc` name.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Z(_) => "z",
            Gate::S(_) => "s",
            Gate::Sdg(_) => "sdg",
            Gate::T(_) => "t",
            Gate::Tdg(_) => "tdg",
            Gate::Sx(_) => "sx",
            Gate::Sxdg(_) => "sxdg",
            Gate::Rx(..) => "rx",
            Gate::Ry(..) => "ry",
            Gate::Rz(..) => "rz",
            Gate::U { .. } => "u",
            Gate::Cx { .. } => "cx",
            Gate::Cz(..) => "cz",
            Gate::Rzz(..) => "rzz",
            Gate::Swap(..) => "swap",
        }
    }

    pub fn params(&self) -> Vec<f64> {
        match *self {
            Gate::Rx(_, t) | Gate::Ry(_, t) | Gate::Rz(_, t) | Gate::Rzz(_, _, t) => vec![t],
            Gate::U {
                theta, phi, lambda, ..
            } => vec![theta, phi, lambda],
            _ => Vec::new(),
        }
    }

    /// Qubits acted on, control first for controlled gates.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Gate::H(q)
            | Gate::X(q)
            | Gate::Z(q)
            | Gate::S(q)
            | Gate::Sdg(q)
            | Gate::T(q)
            | Gate::Tdg(q)
            | Gate::Sx(q)
            | Gate::Sxdg(q)
            | Gate::Rx(q, _)
            | Gate::Ry(q, _)
            | Gate::Rz(q, _)
            | Gate::U { qubit: q, .. } => vec![q],
            Gate::Cx { control, target } => vec![control, target],
            Gate::Cz(a, b) | Gate::Rzz(a, b, _) | Gate::Swap(a, b) => vec![a, b],
        }
    }

    pub fn is_two_qubit(&self) -> bool {
        matches!(self, Gate::Cx { .. } | Gate::Cz(..) | Gate::Rzz(..) | Gate::Swap(..))
    }

    /// Exact inverse (not merely up to global phase).
    pub fn inverse(&self) -> Gate {
        match *self {
            Gate::H(q) => Gate::H(q),
            Gate::X(q) => Gate::X(q),
            Gate::Z(q) => Gate::Z(q),
            Gate::S(q) => Gate::Sdg(q),
            Gate::Sdg(q) => Gate::S(q),
            Gate::T(q) => Gate::Tdg(q),
            Gate::Tdg(q) => Gate::T(q),
            Gate::Sx(q) => Gate::Sxdg(q),
            Gate::Sxdg(q) => Gate::Sx(q),
            Gate::Rx(q, t) => Gate::Rx(q, -t),
            Gate::Ry(q, t) => Gate::Ry(q, -t),
            Gate::Rz(q, t) => Gate::Rz(q, -t),
            Gate::U {
                qubit,
                theta,
                phi,
                lambda,
            } => Gate::U {
                qubit,
                theta: -theta,
                phi: -lambda,
                lambda: -phi,
            },
            g @ (Gate::Cx { .. } | Gate::Cz(..) | Gate::Swap(..)) => g,
            Gate::Rzz(a, b, t) => Gate::Rzz(a, b, -t),
        }
    }

    /// Same gate acting on remapped qubits.
    pub fn remap(&self, map: impl Fn(usize) -> usize) -> Gate {
        match *self {
            Gate::H(q) => Gate::H(map(q)),
            Gate::X(q) => Gate::X(map(q)),
            Gate::Z(q) => Gate::Z(map(q)),
            Gate::S(q) => Gate::S(map(q)),
            Gate::Sdg(q) => Gate::Sdg(map(q)),
            Gate::T(q) => Gate::T(map(q)),
            Gate::Tdg(q) => Gate::Tdg(map(q)),
            Gate::Sx(q) => Gate::Sx(map(q)),
            Gate::Sxdg(q) => Gate::Sxdg(map(q)),
            Gate::Rx(q, t) => Gate::Rx(map(q), t),
            Gate::Ry(q, t) => Gate::Ry(map(q), t),
            Gate::Rz(q, t) => Gate::Rz(map(q), t),
            Gate::U {
                qubit,
                theta,
                phi,
                lambda,
            } => Gate::U {
                qubit: map(qubit),
                theta,
                phi,
                lambda,
            },
            Gate::Cx { control, target } => Gate::Cx {
                control: map(control),
                target: map(target),
            },
            Gate::Cz(a, b) => Gate::Cz(map(a), map(b)),
            Gate::Rzz(a, b, t) => Gate::Rzz(map(a), map(b), t),
            Gate::Swap(a, b) => Gate::Swap(map(a), map(b)),
        }
    }

    /// Unitary of a single-qubit gate, `None` for two-qubit gates.
    pub fn matrix(&self) -> Option<Matrix2> {
        let c = |re: f64, im: f64| Complex64::new(re, im);
        let z = c(0.0, 0.0);
        let one = c(1.0, 0.0);
        let m = match *self {
            Gate::H(_) => {
                let h = c(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::X(_) => [[z, one], [one, z]],
            Gate::Z(_) => [[one, z], [z, -one]],
            Gate::S(_) => [[one, z], [z, c(0.0, 1.0)]],
            Gate::Sdg(_) => [[one, z], [z, c(0.0, -1.0)]],
            Gate::T(_) => [[one, z], [z, Complex64::from_polar(1.0, FRAC_PI_4)]],
            Gate::Tdg(_) => [[one, z], [z, Complex64::from_polar(1.0, -FRAC_PI_4)]],
            Gate::Sx(_) => [[c(0.5, 0.5), c(0.5, -0.5)], [c(0.5, -0.5), c(0.5, 0.5)]],
            Gate::Sxdg(_) => [[c(0.5, -0.5), c(0.5, 0.5)], [c(0.5, 0.5), c(0.5, -0.5)]],
            Gate::Rx(_, t) => {
                let (s, co) = (t / 2.0).sin_cos();
                [[c(co, 0.0), c(0.0, -s)], [c(0.0, -s), c(co, 0.0)]]
            }
            Gate::Ry(_, t) => {
                let (s, co) = (t / 2.0).sin_cos();
                [[c(co, 0.0), c(-s, 0.0)], [c(s, 0.0), c(co, 0.0)]]
            }
            Gate::Rz(_, t) => [
                [Complex64::from_polar(1.0, -t / 2.0), z],
                [z, Complex64::from_polar(1.0, t / 2.0)],
            ],
            Gate::U {
                theta, phi, lambda, ..
            } => {
                let (s, co) = (theta / 2.0).sin_cos();
                [
                    [c(co, 0.0), -Complex64::from_polar(s, lambda)],
                    [Complex64::from_polar(s, phi), Complex64::from_polar(co, phi + lambda)],
                ]
            }
            Gate::Cx { .. } | Gate::Cz(..) | Gate::Rzz(..) | Gate::Swap(..) => return None,
        };
        Some(m)
    }
}

/// `U(θ, φ, λ)` parameters equivalent (up to global phase) to a rotation gate.
pub fn as_u_params(gate: &Gate) -> Option<(f64, f64, f64)> {
    match *gate {
        Gate::Rx(_, t) => Some((t, -FRAC_PI_2, FRAC_PI_2)),
        Gate::Ry(_, t) => Some((t, 0.0, 0.0)),
        Gate::U {
            theta, phi, lambda, ..
        } => Some((theta, phi, lambda)),
        _ => None,
    }
}

/// Wrap an angle into `(−π, π]`.
pub fn normalize_angle(theta: f64) -> f64 {
    let mut t = theta % (2.0 * PI);
    if t <= -PI {
        t += 2.0 * PI;
    } else if t > PI {
        t -= 2.0 * PI;
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mul(a: &Matrix2, b: &Matrix2) -> Matrix2 {
        let mut out = [[Complex64::new(0.0, 0.0); 2]; 2];
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    out[i][j] += a[i][k] * b[k][j];
                }
            }
        }
        out
    }

    #[test]
    fn single_qubit_inverses_are_exact() {
        let gates = [
            Gate::H(0),
            Gate::S(0),
            Gate::T(0),
            Gate::Sx(0),
            Gate::Rx(0, 0.4),
            Gate::Ry(0, -1.3),
            Gate::Rz(0, 2.2),
            Gate::U {
                qubit: 0,
                theta: 0.3,
                phi: 1.1,
                lambda: -0.4,
            },
        ];
        for g in gates {
            let (Some(m), Some(inv)) = (g.matrix(), g.inverse().matrix()) else {
                panic!("{g:?} has no matrix");
            };
            let prod = mul(&inv, &m);
            assert!((prod[0][0] - 1.0).norm() < 1e-12, "{g:?}");
            assert!((prod[1][1] - 1.0).norm() < 1e-12, "{g:?}");
            assert!(prod[0][1].norm() < 1e-12 && prod[1][0].norm() < 1e-12, "{g:?}");
        }
    }

    #[test]
    fn normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!(normalize_angle(-2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn remap_moves_both_qubits() {
        let g = Gate::Cx { control: 0, target: 1 }.remap(|q| q + 5);
        assert_eq!(g.qubits(), vec![5, 6]);
    }
}
