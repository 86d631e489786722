//! Row selections used for reporting
//!
//! Every view ranks rows by their headline mean: the `total` column of a
//! microbenchmark summary or the `time` column of a handshake summary.
//! Catalog names are matched in the table's own naming, so a QKD summary is
//! matched against `qkd_`-prefixed members.

use qkdbench_api::{AggregationError, AggregationResult, Catalog, KemRef};

use crate::summary::{SummaryRow, SummaryTable};

fn by_headline_mean<'s>(rows: impl IntoIterator<Item = &'s SummaryRow>) -> AggregationResult<Vec<&'s SummaryRow>> {
    let mut keyed = rows
        .into_iter()
        .map(|row| Ok((row.headline_mean()?, row)))
        .collect::<AggregationResult<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

fn members_of<'s>(summary: &'s SummaryTable, members: &[KemRef]) -> Vec<&'s SummaryRow> {
    let provider = summary.provider();
    let names: Vec<String> = members.iter().map(|k| k.group_name(provider)).collect();
    summary
        .iter()
        .filter(|row| names.iter().any(|name| name == row.key.algorithm()))
        .collect()
}

/// Rows of catalog algorithms only, fastest first
pub fn catalog_view<'s>(summary: &'s SummaryTable, catalog: &Catalog) -> AggregationResult<Vec<&'s SummaryRow>> {
    by_headline_mean(members_of(summary, catalog.kems()))
}

/// Rows of one family, fastest first
pub fn family_view<'s>(
    summary: &'s SummaryTable,
    catalog: &Catalog,
    family: &str,
) -> qkdbench_api::Result<Vec<&'s SummaryRow>> {
    let members = catalog.family_members(family)?;
    let rows = by_headline_mean(members_of(summary, &members))?;
    if rows.is_empty() {
        return Err(AggregationError::EmptySelection(format!("family {family}")).into());
    }
    Ok(rows)
}

/// Families in catalog order, each family's rows fastest first
pub fn family_ordered<'s>(summary: &'s SummaryTable, catalog: &Catalog) -> AggregationResult<Vec<&'s SummaryRow>> {
    let mut ordered = Vec::with_capacity(summary.len());
    for family in catalog.kem_families() {
        let members: Vec<KemRef> = catalog
            .kems()
            .iter()
            .filter(|k| k.family == family)
            .copied()
            .collect();
        ordered.extend(by_headline_mean(members_of(summary, &members))?);
    }
    Ok(ordered)
}

/// All rows fastest first, up to and including the first row whose name
/// contains `cutoff`
pub fn fastest_until<'s>(summary: &'s SummaryTable, cutoff: &str) -> AggregationResult<Vec<&'s SummaryRow>> {
    let mut rows = by_headline_mean(summary.iter())?;
    let end = rows
        .iter()
        .position(|row| row.key.algorithm().contains(cutoff))
        .ok_or_else(|| AggregationError::EmptySelection(format!("cutoff {cutoff}")))?;
    rows.truncate(end + 1);
    Ok(rows)
}
