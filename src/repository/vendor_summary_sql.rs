// ==========================================
// 供应商绩效分析系统 - 供应商汇总 SQL
// ==========================================
// 红线: SQL 只出现在仓储层，引擎层只消费表格化结果
// 结构: 运费汇总 / 价格目录 / 采购汇总 / 销售汇总 四个 CTE，
//       以采购汇总为左表 LEFT JOIN 其余三者
// ==========================================

/// 采购明细表
pub const PURCHASES_TABLE: &str = "purchases";

/// 品牌价格目录表
pub const PURCHASE_PRICES_TABLE: &str = "purchase_prices";

/// 销售明细表
pub const SALES_TABLE: &str = "sales";

/// 供应商发票表（运费）
pub const VENDOR_INVOICE_TABLE: &str = "vendor_invoice";

/// 汇总查询依赖的全部源表
pub const SOURCE_TABLES: [&str; 4] = [
    PURCHASES_TABLE,
    PURCHASE_PRICES_TABLE,
    SALES_TABLE,
    VENDOR_INVOICE_TABLE,
];

/// 供应商汇总查询
///
/// 说明：
/// - 每个 (VendorNumber, Brand) 只出一行；名称/描述/进价在组内取 MAX
/// - PurchasePrice <= 0 的采购记录视为脏数据剔除（先 CAST，避免文本与数值比较）
/// - 价格目录先按 Brand 聚合，防止目录重复行放大采购合计
/// - 销售/运费缺失时 COALESCE 为 0，行保留
/// - 排序: 采购金额降序；并列按供应商、品牌升序，保证快照稳定
pub const VENDOR_SUMMARY_SQL: &str = r#"
WITH FreightSummary AS (
    SELECT
        VendorNumber,
        SUM(Freight) AS FreightCost
    FROM vendor_invoice
    GROUP BY VendorNumber
),

PriceCatalog AS (
    SELECT
        Brand,
        MAX(Price) AS ActualPrice,
        MAX(Volume) AS Volume
    FROM purchase_prices
    GROUP BY Brand
),

PurchaseSummary AS (
    SELECT
        p.VendorNumber,
        MAX(p.VendorName) AS VendorName,
        p.Brand,
        MAX(p.Description) AS Description,
        MAX(p.PurchasePrice) AS PurchasePrice,
        SUM(p.Quantity) AS TotalPurchaseQuantity,
        SUM(p.Dollars) AS TotalPurchaseDollars
    FROM purchases p
    WHERE CAST(p.PurchasePrice AS REAL) > 0
    GROUP BY p.VendorNumber, p.Brand
),

SalesSummary AS (
    SELECT
        VendorNo,
        Brand,
        SUM(SalesQuantity) AS TotalSalesQuantity,
        SUM(SalesDollars) AS TotalSalesDollars,
        SUM(SalesPrice) AS TotalSalesPrice,
        SUM(ExciseTax) AS TotalExciseTax
    FROM sales
    GROUP BY VendorNo, Brand
)

SELECT
    ps.VendorNumber,
    ps.VendorName,
    ps.Brand,
    ps.Description,
    ps.PurchasePrice,
    pc.ActualPrice,
    pc.Volume,
    ps.TotalPurchaseQuantity,
    ps.TotalPurchaseDollars,
    COALESCE(ss.TotalSalesQuantity, 0) AS TotalSalesQuantity,
    COALESCE(ss.TotalSalesDollars, 0) AS TotalSalesDollars,
    COALESCE(ss.TotalSalesPrice, 0) AS TotalSalesPrice,
    COALESCE(ss.TotalExciseTax, 0) AS TotalExciseTax,
    COALESCE(fs.FreightCost, 0) AS FreightCost
FROM PurchaseSummary ps
LEFT JOIN PriceCatalog pc
    ON ps.Brand = pc.Brand
LEFT JOIN SalesSummary ss
    ON ps.VendorNumber = ss.VendorNo
    AND ps.Brand = ss.Brand
LEFT JOIN FreightSummary fs
    ON ps.VendorNumber = fs.VendorNumber
ORDER BY ps.TotalPurchaseDollars DESC, ps.VendorNumber, ps.Brand
"#;
