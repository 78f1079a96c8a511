//! Householder QR for tall design matrices.

use ndarray::{Array1, Array2, s};

/// Upper-triangular factor and the matching projection of the response.
#[derive(Debug, Clone)]
pub(crate) struct QrSolve {
    /// `k x k` upper-triangular `R`
    pub(crate) r: Array2<f64>,
    /// First `k` entries of `Q^T y`
    pub(crate) qty: Array1<f64>,
}

/// Reduce `x` (n x k, n >= k) to `R` with Householder reflections, applying the
/// same reflections to `y`.
pub(crate) fn householder(x: &Array2<f64>, y: &Array1<f64>) -> QrSolve {
    let (n, k) = x.dim();
    let mut a = x.clone();
    let mut b = y.clone();

    for j in 0..k.min(n) {
        let norm = a.slice(s![j.., j]).dot(&a.slice(s![j.., j])).sqrt();
        if norm == 0.0 {
            continue;
        }

        let alpha = if a[[j, j]] > 0.0 { -norm } else { norm };
        let mut v = a.slice(s![j.., j]).to_owned();
        v[0] -= alpha;
        let v_norm_sq = v.dot(&v);
        if v_norm_sq == 0.0 {
            continue;
        }

        for col in j..k {
            let scale = 2.0 * v.dot(&a.slice(s![j.., col])) / v_norm_sq;
            a.slice_mut(s![j.., col]).scaled_add(-scale, &v);
        }
        let scale = 2.0 * v.dot(&b.slice(s![j..])) / v_norm_sq;
        b.slice_mut(s![j..]).scaled_add(-scale, &v);
    }

    let mut r = a.slice(s![..k, ..]).to_owned();
    for i in 0..k {
        for j in 0..i {
            r[[i, j]] = 0.0;
        }
    }

    QrSolve {
        r,
        qty: b.slice(s![..k]).to_owned(),
    }
}

/// Number of diagonal entries of `R` that are not negligible relative to the largest.
pub(crate) fn numerical_rank(r: &Array2<f64>, tolerance: f64) -> usize {
    let diag = r.diag();
    let largest = diag.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if largest == 0.0 {
        return 0;
    }
    diag.iter().filter(|v| v.abs() > tolerance * largest).count()
}

/// Solve `R x = b` for upper-triangular `R` with a non-zero diagonal.
pub(crate) fn back_substitute(r: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let k = b.len();
    let mut x = Array1::<f64>::zeros(k);
    for i in (0..k).rev() {
        let tail = r.slice(s![i, i + 1..]).dot(&x.slice(s![i + 1..]));
        x[i] = (b[i] - tail) / r[[i, i]];
    }
    x
}

/// Inverse of an upper-triangular matrix, column by column.
pub(crate) fn upper_triangular_inverse(r: &Array2<f64>) -> Array2<f64> {
    let k = r.nrows();
    let mut inv = Array2::<f64>::zeros((k, k));
    for col in 0..k {
        let mut unit = Array1::<f64>::zeros(k);
        unit[col] = 1.0;
        inv.column_mut(col).assign(&back_substitute(r, &unit));
    }
    inv
}
