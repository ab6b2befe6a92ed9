//! Fixture rows loaded by `POST /seed`. The first user is the admin the
//! products are attributed to.

use crate::models::{CreateProductRequest, ROLE_ADMIN, ROLE_USER};

pub struct SeedUser {
    pub email: &'static str,
    pub full_name: &'static str,
    pub password: &'static str,
    pub roles: &'static [&'static str],
}

pub struct SeedProduct {
    pub title: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub stock: i32,
    pub slug: &'static str,
    pub sizes: &'static [&'static str],
    pub gender: &'static str,
    pub tags: &'static [&'static str],
    pub images: &'static [&'static str],
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SeedProduct {
    pub fn to_request(&self) -> CreateProductRequest {
        CreateProductRequest {
            title: self.title.to_string(),
            price: Some(self.price),
            description: Some(self.description.to_string()),
            slug: Some(self.slug.to_string()),
            stock: Some(self.stock),
            sizes: owned(self.sizes),
            gender: self.gender.to_string(),
            tags: Some(owned(self.tags)),
            images: Some(owned(self.images)),
        }
    }
}

pub const USERS: &[SeedUser] = &[
    SeedUser {
        email: "test1@google.com",
        full_name: "Test One",
        password: "Abc123",
        roles: &[ROLE_ADMIN],
    },
    SeedUser {
        email: "test2@google.com",
        full_name: "Test Two",
        password: "Abc123",
        roles: &[ROLE_USER],
    },
];

pub const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        title: "Men's Chill Crew Neck Sweatshirt",
        description: "Relaxed-fit crew neck in heavyweight cotton fleece with a ribbed collar and cuffs.",
        price: 75.0,
        stock: 7,
        slug: "mens_chill_crew_neck_sweatshirt",
        sizes: &["XS", "S", "M", "L", "XL", "XXL"],
        gender: "men",
        tags: &["sweatshirt"],
        images: &["1740176-00-A_0_2000.jpg", "1740176-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Men's Quilted Shirt Jacket",
        description: "Lightweight quilted shell with snap closures, built for cool evenings.",
        price: 200.0,
        stock: 5,
        slug: "men_quilted_shirt_jacket",
        sizes: &["XS", "S", "M", "XL", "XXL"],
        gender: "men",
        tags: &["jacket"],
        images: &["1740507-00-A_0_2000.jpg", "1740507-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Men's Raven Lightweight Zip Up Bomber Jacket",
        description: "Water-resistant bomber with a full zip, welt pockets and a subtle chest logo.",
        price: 130.0,
        stock: 10,
        slug: "men_raven_lightweight_zip_up_bomber_jacket",
        sizes: &["S", "M", "L", "XL", "XXL"],
        gender: "men",
        tags: &["shirt"],
        images: &["1740250-00-A_0_2000.jpg", "1740250-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Men's Turbine Long Sleeve Tee",
        description: "Long sleeve tee in soft ringspun cotton with a printed sleeve graphic.",
        price: 45.0,
        stock: 50,
        slug: "men_turbine_long_sleeve_tee",
        sizes: &["XS", "S", "M", "L"],
        gender: "men",
        tags: &["shirt"],
        images: &["1740280-00-A_0_2000.jpg", "1740280-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Men's Turbine Short Sleeve Tee",
        description: "Everyday short sleeve tee with a tonal chest print.",
        price: 40.0,
        stock: 50,
        slug: "men_turbine_short_sleeve_tee",
        sizes: &["M", "L", "XL", "XXL"],
        gender: "men",
        tags: &["shirt"],
        images: &["1741416-00-A_0_2000.jpg", "1741416-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Women's Cropped Puffer Jacket",
        description: "Cropped puffer with a high collar, two-way zip and recycled fill.",
        price: 225.0,
        stock: 85,
        slug: "women_cropped_puffer_jacket",
        sizes: &["XS", "S", "M"],
        gender: "women",
        tags: &["hoodie"],
        images: &["1740535-00-A_0_2000.jpg", "1740535-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Women's Chill Half Zip Cropped Hoodie",
        description: "Half zip cropped hoodie in brushed fleece with a kangaroo pocket.",
        price: 130.0,
        stock: 10,
        slug: "women_chill_half_zip_cropped_hoodie",
        sizes: &["XS", "S", "M", "XXL"],
        gender: "women",
        tags: &["hoodie"],
        images: &["1740226-00-A_0_2000.jpg", "1740226-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Women's Raven Slouchy Crew Sweatshirt",
        description: "Slouchy oversized crew with dropped shoulders and a raw hem.",
        price: 110.0,
        stock: 9,
        slug: "women_raven_slouchy_crew_sweatshirt",
        sizes: &["XS", "S", "M", "L", "XL", "XXL"],
        gender: "women",
        tags: &["hoodie"],
        images: &["1740260-00-A_0_2000.jpg", "1740260-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Kids Cybertruck Graffiti Hoodie",
        description: "Pullover hoodie for kids with an all-over graffiti print.",
        price: 30.0,
        stock: 10,
        slug: "kids_cybertruck_graffiti_hoodie",
        sizes: &["XS", "S", "M"],
        gender: "kid",
        tags: &["shirt"],
        images: &["1742702-00-A_0_2000.jpg", "1742702-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Kids Scribble T Logo Tee",
        description: "Soft cotton tee with a hand-drawn logo across the chest.",
        price: 25.0,
        stock: 0,
        slug: "kids_scribble_t_logo_tee",
        sizes: &["XS", "S", "M"],
        gender: "kid",
        tags: &["shirt"],
        images: &["8529312-00-A_0_2000.jpg", "8529312-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Solar Roof Beanie",
        description: "Cuffed rib-knit beanie with a woven label.",
        price: 35.0,
        stock: 10,
        slug: "solar_roof_beanie",
        sizes: &[],
        gender: "unisex",
        tags: &["hats"],
        images: &["1740417-00-A_0_2000.jpg", "1740417-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Classic Ceramic Mug",
        description: "Stoneware mug with a glossy glaze, 350 ml.",
        price: 10.0,
        stock: 120,
        slug: "classic_ceramic_mug",
        sizes: &[],
        gender: "unisex",
        tags: &["mug"],
        images: &["1652300-00-A_0_2000.jpg"],
    },
];
