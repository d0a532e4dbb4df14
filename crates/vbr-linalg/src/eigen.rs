//! Eigendecomposition of real symmetric 3×3 matrices.
//!
//! Covariance matrices of 3D point sets are symmetric and positive
//! semi-definite, so their eigenvalues are real and their eigenvectors can be
//! chosen orthonormal. This module diagonalises them with the cyclic Jacobi
//! method: each step applies an exact plane rotation that zeroes one
//! off-diagonal entry, and the accumulated rotations form the eigenvectors.
//!
//! # Mathematical Background
//!
//! ```text
//! M = V Λ Vᵀ
//! ```
//!
//! where:
//! * V ∈ ℝ³ˣ³ is orthogonal, its columns are the eigenvectors
//! * Λ = diag(λ₀, λ₁, λ₂) holds the eigenvalues
//!
//! # Example
//!
//! ```
//! use glam::{DMat3, DVec3};
//! use vbr_linalg::eigen::symmetric_eigen3;
//!
//! let m = DMat3::from_diagonal(DVec3::new(1.0, 3.0, 2.0));
//! let eigen = symmetric_eigen3(&m).sorted_descending();
//!
//! assert_eq!(eigen.eigenvalues(), DVec3::new(3.0, 2.0, 1.0));
//! assert_eq!(eigen.eigenvector(0).y.abs(), 1.0);
//! ```
//!
//! # References
//!
//! * Golub and Van Loan, "Matrix Computations", 4th ed., §8.5 (Jacobi methods).

use glam::{DMat3, DVec3};

/// Upper bound on Jacobi sweeps. Three by three matrices converge in a handful.
const MAX_SWEEPS: usize = 32;

/// Threshold above which `θ²` would overflow when computing the rotation.
const THETA_OVERFLOW: f64 = 1.0e150;

#[derive(Debug, Clone)]
/// A symmetric 3x3 matrix storing only its lower triangle.
struct Symmetric3x3 {
    /// The element at row 0, column 0, first diagonal element.
    m_00: f64,

    /// The element at row 1, column 0. equivalent to `m_01`.
    m_10: f64,

    /// The element at row 1, column 1, the second diagonal element.
    m_11: f64,

    /// The element at row 2, column 0. equivalent to `m_02`.
    m_20: f64,

    /// The element at row 2, column 1. equivalent to `m_12`.
    m_21: f64,

    /// The element at row 2, column 2, the third diagonal element.
    m_22: f64,
}

impl Symmetric3x3 {
    /// Reads the lower triangle of a column-major matrix. The upper triangle is ignored.
    fn from_dmat3(mat: &DMat3) -> Self {
        Symmetric3x3 {
            m_00: mat.x_axis.x,
            m_10: mat.x_axis.y,
            m_11: mat.y_axis.y,
            m_20: mat.x_axis.z,
            m_21: mat.y_axis.z,
            m_22: mat.z_axis.z,
        }
    }

    fn off_diagonal_norm_sq(&self) -> f64 {
        self.m_10 * self.m_10 + self.m_20 * self.m_20 + self.m_21 * self.m_21
    }

    fn frobenius_norm_sq(&self) -> f64 {
        self.m_00 * self.m_00
            + self.m_11 * self.m_11
            + self.m_22 * self.m_22
            + 2.0 * self.off_diagonal_norm_sq()
    }

    fn diagonal(&self) -> DVec3 {
        DVec3::new(self.m_00, self.m_11, self.m_22)
    }
}

#[derive(Debug)]
/// Jacobi rotation parameters that annihilate one off-diagonal entry.
struct Rotation {
    /// The cosine of the rotation angle.
    cos_theta: f64,

    /// The sine of the rotation angle.
    sin_theta: f64,

    /// The tangent of the rotation angle.
    tan_theta: f64,
}

/// Computes the rotation zeroing `s_pq` in the (p, q) plane.
///
/// Returns `None` when the entry is already zero.
#[inline]
fn jacobi_rotation(s_pp: f64, s_qq: f64, s_pq: f64) -> Option<Rotation> {
    if s_pq == 0.0 {
        return None;
    }

    let theta = (s_qq - s_pp) / (2.0 * s_pq);

    // smaller root of t² + 2θt - 1 = 0, keeps the rotation angle below π/4
    let tan_theta = if theta.abs() > THETA_OVERFLOW {
        0.5 / theta
    } else {
        let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
        sign / (theta.abs() + (theta * theta + 1.0).sqrt())
    };

    let cos_theta = 1.0 / (tan_theta * tan_theta + 1.0).sqrt();
    Some(Rotation {
        cos_theta,
        sin_theta: tan_theta * cos_theta,
        tan_theta,
    })
}

/// Rotates the columns `p` and `q` of the eigenvector accumulator.
#[inline]
fn rotate_columns(col_p: &mut DVec3, col_q: &mut DVec3, g: &Rotation) {
    let p = *col_p;
    let q = *col_q;
    *col_p = p * g.cos_theta - q * g.sin_theta;
    *col_q = p * g.sin_theta + q * g.cos_theta;
}

#[inline]
fn conjugate_xy(s: &mut Symmetric3x3, v: &mut DMat3) {
    let Some(g) = jacobi_rotation(s.m_00, s.m_11, s.m_10) else {
        return;
    };

    let s20 = s.m_20;
    let s21 = s.m_21;

    s.m_00 -= g.tan_theta * s.m_10;
    s.m_11 += g.tan_theta * s.m_10;
    s.m_10 = 0.0;
    s.m_20 = g.cos_theta * s20 - g.sin_theta * s21;
    s.m_21 = g.sin_theta * s20 + g.cos_theta * s21;

    rotate_columns(&mut v.x_axis, &mut v.y_axis, &g);
}

#[inline]
fn conjugate_yz(s: &mut Symmetric3x3, v: &mut DMat3) {
    let Some(g) = jacobi_rotation(s.m_11, s.m_22, s.m_21) else {
        return;
    };

    let s10 = s.m_10;
    let s20 = s.m_20;

    s.m_11 -= g.tan_theta * s.m_21;
    s.m_22 += g.tan_theta * s.m_21;
    s.m_21 = 0.0;
    s.m_10 = g.cos_theta * s10 - g.sin_theta * s20;
    s.m_20 = g.sin_theta * s10 + g.cos_theta * s20;

    rotate_columns(&mut v.y_axis, &mut v.z_axis, &g);
}

#[inline]
fn conjugate_xz(s: &mut Symmetric3x3, v: &mut DMat3) {
    let Some(g) = jacobi_rotation(s.m_00, s.m_22, s.m_20) else {
        return;
    };

    let s10 = s.m_10;
    let s21 = s.m_21;

    s.m_00 -= g.tan_theta * s.m_20;
    s.m_22 += g.tan_theta * s.m_20;
    s.m_20 = 0.0;
    s.m_10 = g.cos_theta * s10 - g.sin_theta * s21;
    s.m_21 = g.sin_theta * s10 + g.cos_theta * s21;

    rotate_columns(&mut v.x_axis, &mut v.z_axis, &g);
}

/// Eigenvalues and eigenvectors of a symmetric 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricEigen3 {
    /// The eigenvalues, `eigenvalues[i]` pairs with column `i` of `eigenvectors`.
    eigenvalues: DVec3,

    /// The unit eigenvectors stored as matrix columns.
    eigenvectors: DMat3,
}

impl SymmetricEigen3 {
    /// Get the eigenvalues.
    #[inline]
    pub fn eigenvalues(&self) -> DVec3 {
        self.eigenvalues
    }

    /// Get the eigenvector matrix, one unit eigenvector per column.
    #[inline]
    pub fn eigenvectors(&self) -> &DMat3 {
        &self.eigenvectors
    }

    /// Get the eigenvector paired with the `index`-th eigenvalue.
    ///
    /// PRECONDITION: `index < 3`.
    #[inline]
    pub fn eigenvector(&self, index: usize) -> DVec3 {
        self.eigenvectors.col(index)
    }

    /// Reorders the eigenpairs by descending eigenvalue.
    ///
    /// Equal eigenvalues keep their relative order.
    pub fn sorted_descending(self) -> Self {
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| self.eigenvalues[b].total_cmp(&self.eigenvalues[a]));

        Self {
            eigenvalues: DVec3::new(
                self.eigenvalues[order[0]],
                self.eigenvalues[order[1]],
                self.eigenvalues[order[2]],
            ),
            eigenvectors: DMat3::from_cols(
                self.eigenvectors.col(order[0]),
                self.eigenvectors.col(order[1]),
                self.eigenvectors.col(order[2]),
            ),
        }
    }
}

/// Computes the eigendecomposition of a symmetric 3x3 matrix.
///
/// Only the lower triangle of `m` is read. The eigenpairs are returned in the
/// order the solver produced them; use [`SymmetricEigen3::sorted_descending`]
/// to order them by eigenvalue.
///
/// # Arguments
///
/// * `m` - A symmetric matrix with finite entries.
///
/// # Returns
///
/// The eigenvalues and a matrix whose columns are the corresponding unit eigenvectors.
pub fn symmetric_eigen3(m: &DMat3) -> SymmetricEigen3 {
    let mut s = Symmetric3x3::from_dmat3(m);
    let mut v = DMat3::IDENTITY;

    let tolerance_sq = f64::EPSILON * f64::EPSILON * s.frobenius_norm_sq();

    for _ in 0..MAX_SWEEPS {
        if s.off_diagonal_norm_sq() <= tolerance_sq {
            break;
        }
        conjugate_xy(&mut s, &mut v);
        conjugate_yz(&mut s, &mut v);
        conjugate_xz(&mut s, &mut v);
    }

    // the accumulated rotations drift from unit length by a few ulps
    let eigenvectors = DMat3::from_cols(
        v.x_axis.normalize(),
        v.y_axis.normalize(),
        v.z_axis.normalize(),
    );

    SymmetricEigen3 {
        eigenvalues: s.diagonal(),
        eigenvectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};

    const EPSILON: f64 = 1e-10;

    /// Helper function to validate all critical eigendecomposition properties
    fn verify_eigen_properties(m: &DMat3, eigen: &SymmetricEigen3) {
        let v = *eigen.eigenvectors();
        let d = DMat3::from_diagonal(eigen.eigenvalues());
        let scale = m.to_cols_array().iter().fold(1.0_f64, |a, b| a.max(b.abs()));

        // Property 1: Reconstruction (M = V * D * V.T)
        let reconstruction = v * d * v.transpose();
        assert!(
            m.abs_diff_eq(reconstruction, EPSILON * scale),
            "Reconstruction failed: M != V*D*V.T\nM:\n{}\nReconstruction:\n{}",
            m,
            reconstruction
        );

        // Property 2: V is Orthogonal (V.T * V = I)
        let v_t_v = v.transpose() * v;
        assert!(
            DMat3::IDENTITY.abs_diff_eq(v_t_v, 1e-12),
            "V is not orthogonal: V.T*V != I\nV.T*V:\n{}",
            v_t_v
        );
    }

    fn random_symmetric(rng: &mut impl Rng) -> DMat3 {
        let a = DMat3::from_cols(
            DVec3::new(rng.random(), rng.random(), rng.random()),
            DVec3::new(rng.random(), rng.random(), rng.random()),
            DVec3::new(rng.random(), rng.random(), rng.random()),
        );
        a * a.transpose()
    }

    #[test]
    fn test_eigen3_diagonal() {
        let m = DMat3::from_diagonal(DVec3::new(2.0, 3.0, 1.0));
        let eigen = symmetric_eigen3(&m);
        verify_eigen_properties(&m, &eigen);
        assert_eq!(eigen.eigenvalues(), DVec3::new(2.0, 3.0, 1.0));

        let sorted = eigen.sorted_descending();
        assert_eq!(sorted.eigenvalues(), DVec3::new(3.0, 2.0, 1.0));
        assert_eq!(sorted.eigenvector(0).abs(), DVec3::Y);
        assert_eq!(sorted.eigenvector(1).abs(), DVec3::X);
        assert_eq!(sorted.eigenvector(2).abs(), DVec3::Z);
    }

    #[test]
    fn test_eigen3_zero() {
        let eigen = symmetric_eigen3(&DMat3::ZERO);
        verify_eigen_properties(&DMat3::ZERO, &eigen);
        assert_eq!(eigen.eigenvalues(), DVec3::ZERO);
        assert_eq!(*eigen.eigenvectors(), DMat3::IDENTITY);
    }

    #[test]
    fn test_eigen3_two_by_two_block() {
        // [[a, b], [b, a]] has eigenvalues a ± b along (1, ∓1) / √2
        let m = DMat3::from_cols(
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(1.0, 2.0, 0.0),
            DVec3::new(0.0, 0.0, 5.0),
        );
        let eigen = symmetric_eigen3(&m).sorted_descending();
        verify_eigen_properties(&m, &eigen);

        assert_relative_eq!(eigen.eigenvalues().x, 5.0, epsilon = EPSILON);
        assert_relative_eq!(eigen.eigenvalues().y, 3.0, epsilon = EPSILON);
        assert_relative_eq!(eigen.eigenvalues().z, 1.0, epsilon = EPSILON);

        let v1 = eigen.eigenvector(1);
        let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(v1.x.abs(), inv_sqrt2, epsilon = EPSILON);
        assert_relative_eq!(v1.y.abs(), inv_sqrt2, epsilon = EPSILON);
        assert_relative_eq!(v1.x * v1.y, 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_eigen3_rank1() {
        let u = DVec3::new(1.0, 2.0, 3.0);
        let m = DMat3::from_cols(u * u.x, u * u.y, u * u.z);
        let eigen = symmetric_eigen3(&m).sorted_descending();
        verify_eigen_properties(&m, &eigen);

        assert_relative_eq!(eigen.eigenvalues().x, u.length_squared(), epsilon = EPSILON);
        assert!(eigen.eigenvalues().y.abs() < EPSILON);
        assert!(eigen.eigenvalues().z.abs() < EPSILON);
        assert_relative_eq!(
            eigen.eigenvector(0).dot(u.normalize()).abs(),
            1.0,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_eigen3_matches_faer() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let m = random_symmetric(&mut rng);
            let eigen = symmetric_eigen3(&m).sorted_descending();
            verify_eigen_properties(&m, &eigen);

            let m_faer = faer::Mat::<f64>::from_fn(3, 3, |i, j| m.col(j)[i]);
            // faer returns the eigenvalues in non-decreasing order
            let reference = m_faer.selfadjoint_eigenvalues(faer::Side::Lower);
            for i in 0..3 {
                assert_relative_eq!(eigen.eigenvalues()[i], reference[2 - i], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_sorted_descending_keeps_pairs() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let m = random_symmetric(&mut rng);
        let sorted = symmetric_eigen3(&m).sorted_descending();
        let values = sorted.eigenvalues();
        assert!(values.x >= values.y && values.y >= values.z);

        for i in 0..3 {
            let v = sorted.eigenvector(i);
            let mv = m * v;
            assert!(mv.abs_diff_eq(v * values[i], 1e-10));
        }
    }
}
