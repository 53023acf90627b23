// ==========================================
// 供应商绩效分析系统 - 指标清洗与派生
// ==========================================
// 清洗: 缺失数值补 0，缺失文本补空串，名称/描述去首尾空白，Volume 转浮点
// 派生: GrossProfit / ProfitMargin / StockTurnover / SalesToPurchaseRatio
// 约束: 分母为 0 或结果非有限值时，比率取 0；不产生 NaN / Inf
// ==========================================

use crate::domain::types::CellValue;
use crate::domain::vendor_summary::{RawVendorSummary, VendorSummaryRow};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricEnricher;

impl MetricEnricher {
    pub fn new() -> Self {
        Self
    }

    /// 批量清洗 + 派生，行序保持不变
    pub fn enrich(&self, raw: Vec<RawVendorSummary>) -> Vec<VendorSummaryRow> {
        let rows: Vec<VendorSummaryRow> = raw.into_iter().map(|r| self.enrich_row(r)).collect();
        debug!(rows = rows.len(), "指标派生完成");
        rows
    }

    pub fn enrich_row(&self, raw: RawVendorSummary) -> VendorSummaryRow {
        let total_purchase_quantity = number(raw.total_purchase_quantity);
        let total_purchase_dollars = number(raw.total_purchase_dollars);
        let total_sales_quantity = number(raw.total_sales_quantity);
        let total_sales_dollars = number(raw.total_sales_dollars);

        let gross_profit = finite_or_zero(total_sales_dollars - total_purchase_dollars);

        VendorSummaryRow {
            vendor_number: key(raw.vendor_number),
            vendor_name: trimmed(raw.vendor_name),
            brand: key(raw.brand),
            description: trimmed(raw.description),
            purchase_price: number(raw.purchase_price),
            actual_price: number(raw.actual_price),
            volume: raw.volume.as_f64().map(finite_or_zero).unwrap_or(0.0),
            total_purchase_quantity,
            total_purchase_dollars,
            total_sales_quantity,
            total_sales_dollars,
            total_sales_price: number(raw.total_sales_price),
            total_excise_tax: number(raw.total_excise_tax),
            freight_cost: number(raw.freight_cost),
            gross_profit,
            profit_margin: safe_ratio(gross_profit, total_sales_dollars) * 100.0,
            stock_turnover: safe_ratio(total_sales_quantity, total_purchase_quantity),
            sales_to_purchase_ratio: safe_ratio(total_sales_dollars, total_purchase_dollars),
        }
    }
}

/// 分母为 0 或结果非有限值时返回 0
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn number(v: Option<f64>) -> f64 {
    v.map(finite_or_zero).unwrap_or(0.0)
}

fn trimmed(v: Option<String>) -> String {
    v.map(|s| s.trim().to_string()).unwrap_or_default()
}

// 主键缺失按 0 处理
fn key(v: CellValue) -> CellValue {
    match v {
        CellValue::Null => CellValue::Integer(0),
        other => other,
    }
}
