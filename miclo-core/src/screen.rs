use std::fmt;
use std::str::FromStr;

/// Screens of the product-capture navigation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    AddProduct,
    BarCodeScanner,
    ProductCategories,
    ProductComparison,
    ProductInfo,
    ProductSearch,
    Records,
    RecordsHistory,
    RecordsSaved,
}

impl Screen {
    /// Screens that list records and refresh them in the background when the
    /// user navigates away.
    pub fn is_records_listing(&self) -> bool {
        matches!(
            self,
            Screen::Records | Screen::RecordsHistory | Screen::RecordsSaved
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::AddProduct => "AddProduct",
            Screen::BarCodeScanner => "BarCodeScanner",
            Screen::ProductCategories => "ProductCategories",
            Screen::ProductComparison => "ProductComparison",
            Screen::ProductInfo => "ProductInfo",
            Screen::ProductSearch => "ProductSearch",
            Screen::Records => "Records",
            Screen::RecordsHistory => "RecordsHistory",
            Screen::RecordsSaved => "RecordsSaved",
        };
        f.write_str(name)
    }
}

impl FromStr for Screen {
    type Err = String;

    /// Accepts route names in any case, with or without `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match name.as_str() {
            "addproduct" => Ok(Screen::AddProduct),
            "barcodescanner" | "scanner" => Ok(Screen::BarCodeScanner),
            "productcategories" | "categories" => Ok(Screen::ProductCategories),
            "productcomparison" | "comparison" => Ok(Screen::ProductComparison),
            "productinfo" => Ok(Screen::ProductInfo),
            "productsearch" | "search" => Ok(Screen::ProductSearch),
            "records" => Ok(Screen::Records),
            "recordshistory" | "history" => Ok(Screen::RecordsHistory),
            "recordssaved" | "saved" => Ok(Screen::RecordsSaved),
            _ => Err(format!("Unknown screen '{}'", s)),
        }
    }
}
