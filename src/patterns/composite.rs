//! Composite pattern: cars, garages and groups of garages.
//!
//! Leaves and containers share [`GarageComponent`], so value and car lists
//! are computed the same way at every level of the tree.

use crate::money::Amount;

pub trait GarageComponent: Send + Sync {
    fn name(&self) -> &str;

    fn owner(&self) -> &str;

    /// Sum of every car's price below (and including) this node.
    fn total_value(&self) -> Amount;

    /// Every car below (and including) this node, depth first.
    fn cars(&self) -> Vec<&Car>;

    fn render_into(&self, depth: usize, lines: &mut Vec<String>);

    fn car_list(&self) -> Vec<String> {
        self.cars().iter().map(|c| c.label()).collect()
    }

    fn cars_by_owner(&self, owner: &str) -> Vec<&Car> {
        self.cars().into_iter().filter(|c| c.owner == owner).collect()
    }

    fn render(&self) -> String {
        let mut lines = Vec::new();
        self.render_into(0, &mut lines);
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub name: String,
    pub owner: String,
    pub price: Amount,
    pub model: String,
    pub features: Vec<String>,
}

impl Car {
    pub fn new(name: &str, owner: &str, price: Amount, model: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            price,
            model: model.to_string(),
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: &str) -> Self {
        self.features.push(feature.to_string());
        self
    }

    pub fn label(&self) -> String {
        format!("{} ({}) - {}", self.name, self.model, self.owner)
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(depth)
}

impl GarageComponent for Car {
    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn total_value(&self) -> Amount {
        self.price
    }

    fn cars(&self) -> Vec<&Car> {
        vec![self]
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        let pad = indent(depth + 2);
        lines.push(format!("{}- {} ({})", indent(depth), self.name, self.model));
        lines.push(format!("{pad}owner: {}", self.owner));
        lines.push(format!("{pad}price: {}", self.price));
        if !self.features.is_empty() {
            lines.push(format!("{pad}features: {}", self.features.join(", ")));
        }
    }
}

/// Children shared by both container kinds.
#[derive(Default)]
struct Children(Vec<Box<dyn GarageComponent>>);

impl Children {
    fn total(&self) -> Amount {
        self.0.iter().map(|c| c.total_value()).sum()
    }

    fn cars(&self) -> Vec<&Car> {
        self.0.iter().flat_map(|c| c.cars()).collect()
    }

    fn remove(&mut self, name: &str) -> Option<Box<dyn GarageComponent>> {
        let index = self.0.iter().position(|c| c.name() == name)?;
        Some(self.0.remove(index))
    }

    fn render(&self, depth: usize, lines: &mut Vec<String>) {
        for child in &self.0 {
            child.render_into(depth, lines);
        }
    }
}

macro_rules! container {
    ($ty:ident, $detail:ident) => {
        pub struct $ty {
            name: String,
            owner: String,
            $detail: String,
            children: Children,
        }

        impl $ty {
            pub fn new(name: &str, owner: &str, $detail: &str) -> Self {
                Self {
                    name: name.to_string(),
                    owner: owner.to_string(),
                    $detail: $detail.to_string(),
                    children: Children::default(),
                }
            }

            pub fn add(&mut self, child: impl GarageComponent + 'static) -> &mut Self {
                self.children.0.push(Box::new(child));
                self
            }

            pub fn with(mut self, child: impl GarageComponent + 'static) -> Self {
                self.add(child);
                self
            }

            /// Detach the first direct child called `name`.
            pub fn remove(&mut self, name: &str) -> Option<Box<dyn GarageComponent>> {
                self.children.remove(name)
            }

            pub fn child(&self, index: usize) -> Option<&dyn GarageComponent> {
                self.children.0.get(index).map(|c| c.as_ref())
            }

            /// Number of direct children.
            pub fn len(&self) -> usize {
                self.children.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.children.0.is_empty()
            }

            pub fn $detail(&self) -> &str {
                &self.$detail
            }
        }
    };
}

container!(Garage, location);
container!(GarageGroup, description);

impl GarageComponent for Garage {
    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn total_value(&self) -> Amount {
        self.children.total()
    }

    fn cars(&self) -> Vec<&Car> {
        self.children.cars()
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        let pad = indent(depth + 2);
        lines.push(format!("{}+ {}", indent(depth), self.name));
        lines.push(format!("{pad}location: {}", self.location));
        lines.push(format!("{pad}owner: {}", self.owner));
        lines.push(format!("{pad}cars: {}", self.len()));
        lines.push(format!("{pad}total value: {}", self.total_value()));
        self.children.render(depth + 4, lines);
    }
}

impl GarageComponent for GarageGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn total_value(&self) -> Amount {
        self.children.total()
    }

    fn cars(&self) -> Vec<&Car> {
        self.children.cars()
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        let pad = indent(depth + 2);
        lines.push(format!("{}# {}", indent(depth), self.name));
        lines.push(format!("{pad}description: {}", self.description));
        lines.push(format!("{pad}owner: {}", self.owner));
        lines.push(format!("{pad}members: {}", self.len()));
        lines.push(format!("{pad}total value: {}", self.total_value()));
        self.children.render(depth + 4, lines);
    }
}

/// Two garages in a group plus a standalone premium garage.
pub fn demo_collection() -> GarageGroup {
    let k = Amount::from_units;
    let friends = GarageGroup::new("Friends", "Emil", "Our cars")
        .with(
            Garage::new("Emil's garage", "Emil", "3rd district, 15")
                .with(Car::new("Mercedes C43 AMG", "Emil", k(85_000), "2023").with_feature("all-wheel drive"))
                .with(Car::new("BMW E34", "Emil", k(15_000), "1995").with_feature("manual gearbox")),
        )
        .with(
            Garage::new("Ali's garage", "Ali", "5th district, 22")
                .with(Car::new("Mercedes G-Class", "Ali", k(120_000), "2024").with_feature("V8"))
                .with(Car::new("BMW E38", "Ali", k(8_000), "1998")),
        );
    let premium = Garage::new("Premium garage", "Dmitry", "7th district, 33")
        .with(Car::new("Mercedes G-Class", "Dmitry", k(125_000), "2024").with_feature("AMG package"))
        .with(Car::new("BMW E34", "Emil", k(12_000), "1994"));

    GarageGroup::new("Whole collection", "Admin", "Every car in the system")
        .with(friends)
        .with(premium)
}
