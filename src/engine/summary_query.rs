// ==========================================
// 供应商绩效分析系统 - 汇总查询引擎
// ==========================================
// 输入: purchases / purchase_prices / sales / vendor_invoice 四张源表
// 输出: 每个 (VendorNumber, Brand) 一行 RawVendorSummary
// 红线: 本模块不拼 SQL，查询文本由仓储层提供
// ==========================================

use crate::domain::types::CellValue;
use crate::domain::vendor_summary::{columns, RawVendorSummary};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::vendor_summary_sql::{SOURCE_TABLES, VENDOR_SUMMARY_SQL};
use crate::repository::{QueryResult, TableStore};
use tracing::{debug, info};

pub struct SummaryQueryEngine<'a, S: TableStore> {
    store: &'a S,
}

impl<'a, S: TableStore> SummaryQueryEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// 确认全部源表存在
    pub fn check_sources(&self) -> EngineResult<()> {
        for table in SOURCE_TABLES {
            let exists = self.store.table_exists(table).map_err(EngineError::Query)?;
            if !exists {
                return Err(EngineError::MissingSourceTable(table.to_string()));
            }
        }
        Ok(())
    }

    /// 执行汇总查询
    ///
    /// purchases 为空（或全部被过滤）时返回空集合，不视为错误。
    pub fn fetch(&self) -> EngineResult<Vec<RawVendorSummary>> {
        self.check_sources()?;

        let result = self
            .store
            .query_rows(VENDOR_SUMMARY_SQL)
            .map_err(EngineError::Query)?;
        debug!(rows = result.rows.len(), "汇总查询返回");

        let summaries = decode_rows(&result)?;
        info!(rows = summaries.len(), "汇总查询完成");
        Ok(summaries)
    }
}

// ==========================================
// 结果解码
// ==========================================

struct ColumnMap {
    vendor_number: usize,
    vendor_name: usize,
    brand: usize,
    description: usize,
    purchase_price: usize,
    actual_price: usize,
    volume: usize,
    total_purchase_quantity: usize,
    total_purchase_dollars: usize,
    total_sales_quantity: usize,
    total_sales_dollars: usize,
    total_sales_price: usize,
    total_excise_tax: usize,
    freight_cost: usize,
}

impl ColumnMap {
    fn resolve(result: &QueryResult) -> EngineResult<Self> {
        let idx = |name: &str| {
            result
                .column_index(name)
                .ok_or_else(|| EngineError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            vendor_number: idx(columns::VENDOR_NUMBER)?,
            vendor_name: idx(columns::VENDOR_NAME)?,
            brand: idx(columns::BRAND)?,
            description: idx(columns::DESCRIPTION)?,
            purchase_price: idx(columns::PURCHASE_PRICE)?,
            actual_price: idx(columns::ACTUAL_PRICE)?,
            volume: idx(columns::VOLUME)?,
            total_purchase_quantity: idx(columns::TOTAL_PURCHASE_QUANTITY)?,
            total_purchase_dollars: idx(columns::TOTAL_PURCHASE_DOLLARS)?,
            total_sales_quantity: idx(columns::TOTAL_SALES_QUANTITY)?,
            total_sales_dollars: idx(columns::TOTAL_SALES_DOLLARS)?,
            total_sales_price: idx(columns::TOTAL_SALES_PRICE)?,
            total_excise_tax: idx(columns::TOTAL_EXCISE_TAX)?,
            freight_cost: idx(columns::FREIGHT_COST)?,
        })
    }
}

fn decode_rows(result: &QueryResult) -> EngineResult<Vec<RawVendorSummary>> {
    if result.is_empty() {
        return Ok(Vec::new());
    }

    let map = ColumnMap::resolve(result)?;
    let rows = result
        .rows
        .iter()
        .map(|row| {
            let cell = |i: usize| row.get(i).cloned().unwrap_or(CellValue::Null);
            let num = |i: usize| row.get(i).and_then(CellValue::as_f64);
            let text = |i: usize| row.get(i).and_then(CellValue::as_text);

            RawVendorSummary {
                vendor_number: cell(map.vendor_number),
                vendor_name: text(map.vendor_name),
                brand: cell(map.brand),
                description: text(map.description),
                purchase_price: num(map.purchase_price),
                actual_price: num(map.actual_price),
                volume: cell(map.volume),
                total_purchase_quantity: num(map.total_purchase_quantity),
                total_purchase_dollars: num(map.total_purchase_dollars),
                total_sales_quantity: num(map.total_sales_quantity),
                total_sales_dollars: num(map.total_sales_dollars),
                total_sales_price: num(map.total_sales_price),
                total_excise_tax: num(map.total_excise_tax),
                freight_cost: num(map.freight_cost),
            }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ColumnDescriptor, ColumnType, TableSchema, WriteMode};
    use crate::repository::SqliteTableStore;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn write(store: &SqliteTableStore, name: &str, cols: &[(&str, ColumnType)], rows: Vec<Vec<CellValue>>) {
        let schema = TableSchema::new(
            cols.iter()
                .map(|(n, t)| ColumnDescriptor::new(*n, *t))
                .collect(),
        );
        store
            .write_table(name, &schema, &rows, WriteMode::Replace)
            .unwrap();
    }

    fn seed_sources(store: &SqliteTableStore) {
        use ColumnType::*;
        write(
            store,
            "purchases",
            &[
                ("VendorNumber", Integer),
                ("VendorName", Text),
                ("Brand", Integer),
                ("Description", Text),
                ("PurchasePrice", Real),
                ("Quantity", Integer),
                ("Dollars", Real),
            ],
            vec![
                vec![CellValue::Integer(1), text("ACME "), CellValue::Integer(10), text("Gin"), CellValue::Real(10.0), CellValue::Integer(10), CellValue::Real(100.0)],
                vec![CellValue::Integer(1), text("ACME "), CellValue::Integer(10), text("Gin"), CellValue::Real(10.0), CellValue::Integer(5), CellValue::Real(50.0)],
                vec![CellValue::Integer(2), text("Beta"), CellValue::Integer(20), text("Rum"), CellValue::Real(10.0), CellValue::Integer(5), CellValue::Real(50.0)],
                // 非正进价被过滤
                vec![CellValue::Integer(3), text("Zero"), CellValue::Integer(30), text("Free"), CellValue::Real(0.0), CellValue::Integer(9), CellValue::Real(900.0)],
            ],
        );
        write(
            store,
            "purchase_prices",
            &[("Brand", Integer), ("Price", Real), ("Volume", Text)],
            vec![
                vec![CellValue::Integer(10), CellValue::Real(15.0), text("750")],
                vec![CellValue::Integer(20), CellValue::Real(20.0), text("1000")],
            ],
        );
        write(
            store,
            "sales",
            &[
                ("VendorNo", Integer),
                ("Brand", Integer),
                ("SalesQuantity", Integer),
                ("SalesDollars", Real),
                ("SalesPrice", Real),
                ("ExciseTax", Real),
            ],
            vec![vec![CellValue::Integer(2), CellValue::Integer(20), CellValue::Integer(5), CellValue::Real(200.0), CellValue::Real(40.0), CellValue::Real(1.5)]],
        );
        write(
            store,
            "vendor_invoice",
            &[("VendorNumber", Integer), ("Freight", Real)],
            vec![
                vec![CellValue::Integer(1), CellValue::Real(2.0)],
                vec![CellValue::Integer(1), CellValue::Real(3.0)],
            ],
        );
    }

    #[test]
    fn test_fetch_aggregates_per_vendor_brand() {
        let store = SqliteTableStore::in_memory().unwrap();
        seed_sources(&store);

        let rows = SummaryQueryEngine::new(&store).fetch().unwrap();
        assert_eq!(rows.len(), 2);

        // 按采购金额降序
        let first = &rows[0];
        assert_eq!(first.vendor_number, CellValue::Integer(1));
        assert_eq!(first.total_purchase_quantity, Some(15.0));
        assert_eq!(first.total_purchase_dollars, Some(150.0));
        assert_eq!(first.total_sales_dollars, Some(0.0));
        assert_eq!(first.freight_cost, Some(5.0));
        assert_eq!(first.actual_price, Some(15.0));

        let second = &rows[1];
        assert_eq!(second.vendor_number, CellValue::Integer(2));
        assert_eq!(second.total_sales_dollars, Some(200.0));
        assert_eq!(second.total_excise_tax, Some(1.5));
        assert_eq!(second.freight_cost, Some(0.0));
        assert_eq!(second.volume, text("1000"));
    }

    #[test]
    fn test_missing_source_table() {
        let store = SqliteTableStore::in_memory().unwrap();
        seed_sources(&store);
        store.drop_table("sales").unwrap();

        let err = SummaryQueryEngine::new(&store).fetch().unwrap_err();
        assert!(matches!(err, EngineError::MissingSourceTable(ref t) if t == "sales"));
    }

    #[test]
    fn test_empty_purchases_returns_empty() {
        let store = SqliteTableStore::in_memory().unwrap();
        seed_sources(&store);
        write(
            &store,
            "purchases",
            &[
                ("VendorNumber", ColumnType::Integer),
                ("VendorName", ColumnType::Text),
                ("Brand", ColumnType::Integer),
                ("Description", ColumnType::Text),
                ("PurchasePrice", ColumnType::Real),
                ("Quantity", ColumnType::Integer),
                ("Dollars", ColumnType::Real),
            ],
            vec![],
        );

        let rows = SummaryQueryEngine::new(&store).fetch().unwrap();
        assert!(rows.is_empty());
    }
}
