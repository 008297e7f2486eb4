// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use nw_allocation::domain::{
    AbcClass, AllocationInput, AllocationRequest, Channel, ChannelType, CoverageDaysRule,
    DemandEntry, InventoryRecord, NumericField, OptimizationParameters, OutletAssortmentRule,
    OutletSkuCapacityRule, Product,
};

// ==========================================
// Product 构建器
// ==========================================

pub struct ProductBuilder {
    product: Product,
}

impl ProductBuilder {
    pub fn new(sku: &str) -> Self {
        Self {
            product: Product::new(sku),
        }
    }

    pub fn brand(mut self, brand: &str) -> Self {
        self.product.brand = Some(brand.to_string());
        self
    }

    pub fn division(mut self, division: &str) -> Self {
        self.product.division = Some(division.to_string());
        self
    }

    pub fn axis(mut self, axis: &str) -> Self {
        self.product.axis = Some(axis.to_string());
        self
    }

    pub fn sub_axis(mut self, sub_axis: &str) -> Self {
        self.product.sub_axis = Some(sub_axis.to_string());
        self
    }

    pub fn metier(mut self, metier: &str) -> Self {
        self.product.metier = Some(metier.to_string());
        self
    }

    pub fn abc(mut self, class: AbcClass) -> Self {
        self.product.abc_class = Some(class);
        self
    }

    pub fn donation_eligible(mut self, eligible: bool) -> Self {
        self.product.donation_eligible = eligible;
        self
    }

    pub fn build(self) -> Product {
        self.product
    }
}

// ==========================================
// Channel 快捷构造
// ==========================================

pub fn store(id: &str, capacity: f64) -> Channel {
    let mut channel = Channel::new(id, ChannelType::Store);
    channel.capacity = Some(NumericField::from(capacity));
    channel
}

pub fn outlet(id: &str) -> Channel {
    Channel::new(id, ChannelType::Outlet)
}

pub fn donation(id: &str, capacity: f64) -> Channel {
    let mut channel = Channel::new(id, ChannelType::Donation);
    channel.capacity = Some(NumericField::from(capacity));
    channel
}

// ==========================================
// 场景构建器
// ==========================================

#[derive(Default)]
pub struct ScenarioBuilder {
    products: Vec<Product>,
    channels: Vec<Channel>,
    inventory: Vec<InventoryRecord>,
    demand: Vec<DemandEntry>,
    parameters: OptimizationParameters,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn inventory(mut self, sku: &str, quantity: i64) -> Self {
        self.inventory.push(InventoryRecord::new(sku, quantity));
        self
    }

    pub fn demand(mut self, sku: &str, channel_id: &str, weekly: f64) -> Self {
        self.demand.push(DemandEntry::new(sku, channel_id, weekly));
        self
    }

    pub fn restricted_brands(mut self, brands: &[&str]) -> Self {
        self.parameters.restricted_brands_for_donation =
            Some(brands.iter().map(|b| b.to_string()).collect());
        self
    }

    pub fn coverage(mut self, channel_id: &str, class: AbcClass, days: impl Into<NumericField>) -> Self {
        self.parameters
            .coverage_days_rules
            .push(CoverageDaysRule::new(channel_id, class, days));
        self
    }

    pub fn outlet_capacity(
        mut self,
        channel_id: &str,
        division: &str,
        axis: &str,
        max_skus: impl Into<NumericField>,
    ) -> Self {
        self.parameters
            .outlet_sku_capacity_rules
            .push(OutletSkuCapacityRule::new(channel_id, division, axis, max_skus));
        self
    }

    pub fn assortment(
        mut self,
        metier: &str,
        sub_axis: &str,
        brand: &str,
        max_skus: impl Into<NumericField>,
    ) -> Self {
        self.parameters
            .outlet_assortment_rules
            .push(OutletAssortmentRule::new(metier, sub_axis, brand, max_skus));
        self
    }

    pub fn build_request(self) -> AllocationRequest {
        AllocationRequest {
            parameters: self.parameters,
            products: self.products,
            channels: self.channels,
            inventory: self.inventory,
            demand: self.demand,
        }
    }

    pub fn build_input(self) -> AllocationInput {
        AllocationInput::from(self.build_request())
    }
}
