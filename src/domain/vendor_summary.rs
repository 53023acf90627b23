// ==========================================
// 供应商绩效分析系统 - 供应商汇总实体
// ==========================================
// 主键: (VendorNumber, Brand)
// 不变量: 采购数据中每个 (供应商, 品牌) 恰好一行；
//         无销售/运费记录时对应字段为 0，行不丢弃
// ==========================================

use crate::domain::types::{CellValue, ColumnDescriptor, ColumnType, TableSchema};
use serde::{Deserialize, Serialize};

// ==========================================
// 汇总表列名（与持久化表一致）
// ==========================================
pub mod columns {
    pub const VENDOR_NUMBER: &str = "VendorNumber";
    pub const VENDOR_NAME: &str = "VendorName";
    pub const BRAND: &str = "Brand";
    pub const DESCRIPTION: &str = "Description";
    pub const PURCHASE_PRICE: &str = "PurchasePrice";
    pub const ACTUAL_PRICE: &str = "ActualPrice";
    pub const VOLUME: &str = "Volume";
    pub const TOTAL_PURCHASE_QUANTITY: &str = "TotalPurchaseQuantity";
    pub const TOTAL_PURCHASE_DOLLARS: &str = "TotalPurchaseDollars";
    pub const TOTAL_SALES_QUANTITY: &str = "TotalSalesQuantity";
    pub const TOTAL_SALES_DOLLARS: &str = "TotalSalesDollars";
    pub const TOTAL_SALES_PRICE: &str = "TotalSalesPrice";
    pub const TOTAL_EXCISE_TAX: &str = "TotalExciseTax";
    pub const FREIGHT_COST: &str = "FreightCost";
    pub const GROSS_PROFIT: &str = "GrossProfit";
    pub const PROFIT_MARGIN: &str = "ProfitMargin";
    pub const STOCK_TURNOVER: &str = "StockTurnover";
    pub const SALES_TO_PURCHASE_RATIO: &str = "SalesToPurchaseRatio";
}

// ==========================================
// RawVendorSummary - 聚合查询原始结果
// ==========================================
// 说明: 直接来自存储层，字段可能为 NULL，尚未清洗
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVendorSummary {
    pub vendor_number: CellValue,
    pub vendor_name: Option<String>,
    pub brand: CellValue,
    pub description: Option<String>,
    pub purchase_price: Option<f64>,
    pub actual_price: Option<f64>,
    pub volume: CellValue, // 目录中可能是文本，清洗阶段统一转为浮点
    pub total_purchase_quantity: Option<f64>,
    pub total_purchase_dollars: Option<f64>,
    pub total_sales_quantity: Option<f64>,
    pub total_sales_dollars: Option<f64>,
    pub total_sales_price: Option<f64>,
    pub total_excise_tax: Option<f64>,
    pub freight_cost: Option<f64>,
}

// ==========================================
// VendorSummaryRow - 清洗 + 派生后的汇总行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSummaryRow {
    pub vendor_number: CellValue,
    pub vendor_name: String,
    pub brand: CellValue,
    pub description: String,
    pub purchase_price: f64,
    pub actual_price: f64,
    pub volume: f64,
    pub total_purchase_quantity: f64,
    pub total_purchase_dollars: f64,
    pub total_sales_quantity: f64,
    pub total_sales_dollars: f64,
    pub total_sales_price: f64,
    pub total_excise_tax: f64,
    pub freight_cost: f64,

    // 派生指标
    pub gross_profit: f64,
    pub profit_margin: f64,
    pub stock_turnover: f64,
    pub sales_to_purchase_ratio: f64,
}

impl VendorSummaryRow {
    /// 持久化表结构
    ///
    /// VendorNumber / Brand 声明为 INTEGER 亲和性；非数字的品牌值仍以 TEXT 存储。
    pub fn schema() -> TableSchema {
        use columns::*;
        TableSchema::new(vec![
            ColumnDescriptor::new(VENDOR_NUMBER, ColumnType::Integer),
            ColumnDescriptor::new(VENDOR_NAME, ColumnType::Text),
            ColumnDescriptor::new(BRAND, ColumnType::Integer),
            ColumnDescriptor::new(DESCRIPTION, ColumnType::Text),
            ColumnDescriptor::new(PURCHASE_PRICE, ColumnType::Real),
            ColumnDescriptor::new(ACTUAL_PRICE, ColumnType::Real),
            ColumnDescriptor::new(VOLUME, ColumnType::Real),
            ColumnDescriptor::new(TOTAL_PURCHASE_QUANTITY, ColumnType::Real),
            ColumnDescriptor::new(TOTAL_PURCHASE_DOLLARS, ColumnType::Real),
            ColumnDescriptor::new(TOTAL_SALES_QUANTITY, ColumnType::Real),
            ColumnDescriptor::new(TOTAL_SALES_DOLLARS, ColumnType::Real),
            ColumnDescriptor::new(TOTAL_SALES_PRICE, ColumnType::Real),
            ColumnDescriptor::new(TOTAL_EXCISE_TAX, ColumnType::Real),
            ColumnDescriptor::new(FREIGHT_COST, ColumnType::Real),
            ColumnDescriptor::new(GROSS_PROFIT, ColumnType::Real),
            ColumnDescriptor::new(PROFIT_MARGIN, ColumnType::Real),
            ColumnDescriptor::new(STOCK_TURNOVER, ColumnType::Real),
            ColumnDescriptor::new(SALES_TO_PURCHASE_RATIO, ColumnType::Real),
        ])
    }

    /// 转换为写入行（列顺序与 `schema()` 一致）
    pub fn to_cells(&self) -> Vec<CellValue> {
        vec![
            self.vendor_number.clone(),
            CellValue::Text(self.vendor_name.clone()),
            self.brand.clone(),
            CellValue::Text(self.description.clone()),
            CellValue::Real(self.purchase_price),
            CellValue::Real(self.actual_price),
            CellValue::Real(self.volume),
            CellValue::Real(self.total_purchase_quantity),
            CellValue::Real(self.total_purchase_dollars),
            CellValue::Real(self.total_sales_quantity),
            CellValue::Real(self.total_sales_dollars),
            CellValue::Real(self.total_sales_price),
            CellValue::Real(self.total_excise_tax),
            CellValue::Real(self.freight_cost),
            CellValue::Real(self.gross_profit),
            CellValue::Real(self.profit_margin),
            CellValue::Real(self.stock_turnover),
            CellValue::Real(self.sales_to_purchase_ratio),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_matches_cells() {
        let row = VendorSummaryRow {
            vendor_number: CellValue::Integer(1),
            vendor_name: "ACME".to_string(),
            brand: CellValue::Text("A".to_string()),
            description: "Gin".to_string(),
            purchase_price: 1.0,
            actual_price: 2.0,
            volume: 750.0,
            total_purchase_quantity: 10.0,
            total_purchase_dollars: 100.0,
            total_sales_quantity: 0.0,
            total_sales_dollars: 0.0,
            total_sales_price: 0.0,
            total_excise_tax: 0.0,
            freight_cost: 0.0,
            gross_profit: -100.0,
            profit_margin: 0.0,
            stock_turnover: 0.0,
            sales_to_purchase_ratio: 0.0,
        };

        assert_eq!(VendorSummaryRow::schema().len(), row.to_cells().len());
    }
}
