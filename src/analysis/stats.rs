pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Ordinary least squares of `values` against their 0-based position.
///
/// A constant series has slope 0 and R² 0 exactly.
pub fn linear_fit(values: &[f64]) -> Option<LinearFit> {
    if values.len() < 2 {
        return None;
    }
    if is_constant(values) {
        return Some(LinearFit {
            slope: 0.0,
            intercept: values[0],
            r_squared: 0.0,
        });
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values)?;

    let (sxy, sxx) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, y)| {
            let dx = i as f64 - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_tot = values.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>();
    let ss_res = values
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum::<f64>();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Pearson correlation; `None` when fewer than two points, either side has
/// no variance, or the coefficient is not finite.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 || is_constant(x) || is_constant(y) {
        return None;
    }
    let x = scaled(x)?;
    let y = scaled(y)?;
    let x_mean = mean(&x)?;
    let y_mean = mean(&y)?;
    let (cov, x_var, y_var) =
        x.iter()
            .zip(&y)
            .fold((0.0, 0.0, 0.0), |(cov, x_var, y_var), (xi, yi)| {
                let dx = xi - x_mean;
                let dy = yi - y_mean;
                (cov + dx * dy, x_var + dx * dx, y_var + dy * dy)
            });
    if x_var == 0.0 || y_var == 0.0 {
        return None;
    }
    Some(cov / (x_var.sqrt() * y_var.sqrt()))
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(-1.0, 1.0))
}

/// Divides by the largest magnitude so sums of squares stay in range.
fn scaled(values: &[f64]) -> Option<Vec<f64>> {
    let peak = values.iter().fold(0.0_f64, |peak, v| peak.max(v.abs()));
    if peak == 0.0 || !peak.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| v / peak).collect())
}

/// Pairwise Pearson coefficients; undefined pairs are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn compute(columns: Vec<String>, series: &[Vec<f64>]) -> Self {
        let values = series
            .iter()
            .map(|x| series.iter().map(|y| pearson(x, y)).collect())
            .collect();
        Self { columns, values }
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.values.get(row)?.get(column).copied().flatten()
    }

    /// Column with the largest absolute coefficient against `row`, excluding
    /// `row` itself. Ties keep the earlier column.
    pub fn strongest_partner(&self, row: usize) -> Option<(&str, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for column in (0..self.columns.len()).filter(|column| *column != row) {
            let Some(value) = self.get(row, column) else {
                continue;
            };
            if best.is_none_or(|(_, current)| value.abs() > current.abs()) {
                best = Some((column, value));
            }
        }
        best.map(|(column, value)| (self.columns[column].as_str(), value))
    }
}
