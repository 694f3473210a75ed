use clap::Parser;
use fake::faker::address::en::CityName;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use sqlx::sqlite::SqlitePoolOptions;

use verdant::{
    auth::AuthService,
    domain::{ApprovalStatus, CreateAgentRequest, CreatePlantRequest, CreateUserRequest, UserRole},
    repository::{
        DeliveryAgentRepository, PlantRepository, SqliteDeliveryAgentRepository,
        SqlitePlantRepository, SqliteUserRepository, UserRepository,
    },
};

const CATEGORIES: &[&str] = &["Indoor", "Outdoor", "Succulent", "Flowering", "Herb", "Bonsai"];
const SPECIES: &[&str] = &[
    "Monstera deliciosa",
    "Sansevieria trifasciata",
    "Ficus lyrata",
    "Epipremnum aureum",
    "Aloe vera",
    "Ocimum basilicum",
    "Rosa chinensis",
    "Crassula ovata",
];

#[derive(Parser)]
#[command(name = "seed", about = "Populate a Verdant database with development data")]
struct Args {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://verdant.db?mode=rwc")]
    database_url: String,
    #[arg(long, default_value_t = 3)]
    sellers: usize,
    #[arg(long, default_value_t = 5)]
    buyers: usize,
    #[arg(long, default_value_t = 6, help = "Plants listed per seller")]
    plants_per_seller: usize,
    #[arg(long, default_value_t = 4)]
    agents: usize,
    #[arg(long, default_value = "password123", help = "Password for every seeded account")]
    password: String,
}

fn user_request(name: String, email: String, password: &str) -> CreateUserRequest {
    CreateUserRequest {
        name,
        email,
        password: password.to_string(),
        phone: None,
        address: Some(CityName().fake()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let plant_repo = SqlitePlantRepository::new(db_pool.clone());
    let agent_repo = SqliteDeliveryAgentRepository::new(db_pool.clone());
    let hash = AuthService::hash_password(&args.password)?;

    println!("👥 Creating users...");
    user_repo
        .create(
            &user_request("Admin User".to_string(), "admin@verdant.local".to_string(), &args.password),
            &hash,
            UserRole::Admin,
        )
        .await?;
    println!("  ✅ Created admin user (admin@verdant.local / {})", args.password);

    let mut sellers = Vec::with_capacity(args.sellers);
    for i in 1..=args.sellers {
        let request = user_request(Name().fake(), format!("seller{}@verdant.local", i), &args.password);
        let seller = user_repo.create(&request, &hash, UserRole::Seller).await?;
        let seller = user_repo
            .update_vendor_status(seller.id, ApprovalStatus::Approved)
            .await?;
        sellers.push(seller);
    }
    println!("  ✅ Created {} approved sellers", sellers.len());

    for i in 1..=args.buyers {
        let request = user_request(Name().fake(), format!("buyer{}@verdant.local", i), &args.password);
        user_repo.create(&request, &hash, UserRole::User).await?;
    }
    println!("  ✅ Created {} buyers", args.buyers);

    println!("🪴 Listing plants...");
    let mut plant_count = 0;
    for (s, seller) in sellers.iter().enumerate() {
        for p in 0..args.plants_per_seller {
            let species = SPECIES[(s + p) % SPECIES.len()];
            let request = CreatePlantRequest {
                name: species.split(' ').next().unwrap_or(species).to_string(),
                description: Some(Sentence(6..12).fake()),
                price_cents: (199..4999i64).fake::<i64>() * 10,
                category: Some(CATEGORIES[p % CATEGORIES.len()].to_string()),
                species: Some(species.to_string()),
                care_instructions: Some(Sentence(8..14).fake()),
                stock_quantity: (0..40i64).fake(),
                image_url: None,
                verified_by_ai: p % 2 == 0,
            };
            plant_repo
                .create(seller.id, &request, ApprovalStatus::Approved)
                .await?;
            plant_count += 1;
        }
    }
    println!("  ✅ Listed {} plants", plant_count);

    println!("🚚 Registering delivery agents...");
    for i in 1..=args.agents {
        agent_repo
            .create(&CreateAgentRequest {
                name: Name().fake(),
                phone: format!("+9198{:08}", i),
                email: Some(format!("agent{}@verdant.local", i)),
                current_location: Some(CityName().fake()),
            })
            .await?;
    }
    println!("  ✅ Registered {} delivery agents", args.agents);

    println!("🎉 Seeding complete!");
    Ok(())
}
