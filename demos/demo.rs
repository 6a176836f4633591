use glider::prelude::*;

#[derive(Debug, Default)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
}

impl FieldAccess for Product {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "title" => Some(Value::from(&self.title)),
            "price" => Some(Value::from(self.price)),
            _ => None,
        }
    }

    fn field_names(&self) -> Vec<String> {
        vec!["id".into(), "title".into(), "price".into()]
    }
}

impl ResultMapper for Product {
    fn properties(&self) -> &'static [&'static str] {
        &["id", "title", "price"]
    }

    // Skip free samples
    fn register(&mut self, row: &Row) -> bool {
        row.get("price").and_then(Value::as_f64).unwrap_or_default() > 0.0
    }

    fn map_field(&mut self, column: &str, value: Value) {
        match column {
            "id" => self.id = value.as_i64().unwrap_or_default(),
            "title" => self.title = value.as_str().unwrap_or_default().to_string(),
            "price" => self.price = value.as_f64().unwrap_or_default(),
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 Glider Demo\n");

    let profile = ConnectionProfile::new("sqlite", "sqlite::memory:").with_auto_commit(false);
    let glider = Glider::new(AppConfig::single("demo", profile))?;
    let mut platform = glider.connect_default()?;
    println!("Connected to {} ({:?})", platform.name(), platform.dialect());

    QueryBuilder::new(&mut platform)
        .raw_query("CREATE TABLE products (id INTEGER PRIMARY KEY, title TEXT, price REAL)")
        .execute()?;

    let catalog = [("Lamp", 24.5), ("Desk", 180.0), ("Sticker", 0.0), ("Chair", 95.0)];
    for (title, price) in catalog {
        let record = Record::new(&["title", "price"])
            .with("title", title)?
            .with("price", price)?;
        let result = QueryBuilder::new(&mut platform).insert("products", record)?;
        println!("Inserted {} as #{:?}", title, result.last_insert_id());
    }

    let products = QueryBuilder::new(&mut platform)
        .select(&["id", "title", "price"])
        .from("products")
        .where_between("price", 0.0, 100.0)
        .order_by(&["price"])
        .get_as::<Product>()?;

    println!("\nAffordable products:");
    for product in products.iter() {
        println!("  {} costs {:.2}", product.title, product.price);
    }
    println!("As JSON: {}", products.to_json());

    let changed = QueryBuilder::new(&mut platform)
        .where_("title", "Desk")
        .update("products", [("price", Value::from(150.0))])?;
    println!("\nRepriced {} product(s)", changed.rows_affected());

    let mut totals = QueryBuilder::new(&mut platform)
        .count("id", "items")
        .avg("price", "average")
        .from("products")
        .get()?;
    if let Some(row) = totals.first() {
        println!("Totals: {}", row.to_json());
    }

    Ok(())
}
