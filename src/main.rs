//! TechFix admin command-line entry point.

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use techfix_admin::auth::{AuthClient, LoginFailure, LoginOutcome};
use techfix_admin::config::Config;
use techfix_admin::error::AdminError;
use techfix_admin::metrics;
use techfix_admin::pipeline::{ApiClient, Service, ServiceEndpoint};
use techfix_admin::resources::{Backends, ResourceClient, ResourceId};
use techfix_admin::session::{CredentialState, Session};
use techfix_admin::views::{
    submit_create, submit_update, ComponentForm, DetailView, ListView, Notice, OrderForm,
    QuotationForm, RecordForm, Render,
};

/// TechFix staff administration client.
#[derive(Parser, Debug)]
#[command(name = "techfix-admin")]
#[command(about = "Manage TechFix components, quotations and orders")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    /// What to do with the stored token after a 401 (clear_credential, keep).
    #[arg(long, global = true)]
    on_unauthorized: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the bearer token.
    Login {
        /// Account name.
        #[arg(short, long)]
        username: String,

        /// Password.
        #[arg(short, long, env = "TECHFIX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored token.
    Logout,

    /// Create a staff account.
    Register {
        /// Account name.
        #[arg(short, long)]
        username: String,

        /// Contact email.
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters).
        #[arg(short, long, env = "TECHFIX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show whether a token is stored.
    Status,

    /// Inventory components.
    Components {
        #[command(subcommand)]
        action: ComponentAction,
    },

    /// Price quotations.
    Quotations {
        #[command(subcommand)]
        action: QuotationAction,
    },

    /// Customer orders.
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[derive(Subcommand, Debug)]
enum ComponentAction {
    /// List every component.
    List,
    /// Show one component.
    Show { id: ResourceId },
    /// Add a component.
    Add {
        #[command(flatten)]
        fields: ComponentFields,
    },
    /// Change fields of a component.
    Edit {
        id: ResourceId,
        #[command(flatten)]
        fields: ComponentFields,
    },
    /// Delete a component.
    Delete { id: ResourceId },
}

#[derive(Subcommand, Debug)]
enum QuotationAction {
    /// List every quotation.
    List,
    /// Show one quotation.
    Show { id: ResourceId },
    /// Add a quotation.
    Add {
        #[command(flatten)]
        fields: QuotationFields,
    },
    /// Change fields of a quotation.
    Edit {
        id: ResourceId,
        #[command(flatten)]
        fields: QuotationFields,
    },
    /// Delete a quotation.
    Delete { id: ResourceId },
}

#[derive(Subcommand, Debug)]
enum OrderAction {
    /// List every order.
    List,
    /// Show one order.
    Show { id: ResourceId },
    /// Add an order.
    Add {
        #[command(flatten)]
        fields: OrderFields,
    },
    /// Change fields of an order.
    Edit {
        id: ResourceId,
        #[command(flatten)]
        fields: OrderFields,
    },
    /// Delete an order.
    Delete { id: ResourceId },
}

/// A record command with its resource-specific field flags.
enum Action<F> {
    List,
    Show(ResourceId),
    Add(F),
    Edit(ResourceId, F),
    Delete(ResourceId),
}

impl From<ComponentAction> for Action<ComponentFields> {
    fn from(action: ComponentAction) -> Self {
        match action {
            ComponentAction::List => Action::List,
            ComponentAction::Show { id } => Action::Show(id),
            ComponentAction::Add { fields } => Action::Add(fields),
            ComponentAction::Edit { id, fields } => Action::Edit(id, fields),
            ComponentAction::Delete { id } => Action::Delete(id),
        }
    }
}

impl From<QuotationAction> for Action<QuotationFields> {
    fn from(action: QuotationAction) -> Self {
        match action {
            QuotationAction::List => Action::List,
            QuotationAction::Show { id } => Action::Show(id),
            QuotationAction::Add { fields } => Action::Add(fields),
            QuotationAction::Edit { id, fields } => Action::Edit(id, fields),
            QuotationAction::Delete { id } => Action::Delete(id),
        }
    }
}

impl From<OrderAction> for Action<OrderFields> {
    fn from(action: OrderAction) -> Self {
        match action {
            OrderAction::List => Action::List,
            OrderAction::Show { id } => Action::Show(id),
            OrderAction::Add { fields } => Action::Add(fields),
            OrderAction::Edit { id, fields } => Action::Edit(id, fields),
            OrderAction::Delete { id } => Action::Delete(id),
        }
    }
}

/// Field flags that overlay a form.
trait FormFields {
    type Form: RecordForm + Default;

    fn apply(self, form: &mut Self::Form);
}

#[derive(ClapArgs, Debug)]
struct ComponentFields {
    /// Display name.
    #[arg(long)]
    name: Option<String>,

    /// Description.
    #[arg(long)]
    description: Option<String>,

    /// Unit price.
    #[arg(long)]
    price: Option<String>,

    /// Units in stock.
    #[arg(long)]
    stock: Option<String>,
}

impl FormFields for ComponentFields {
    type Form = ComponentForm;

    fn apply(self, form: &mut ComponentForm) {
        overlay(&mut form.name, self.name);
        overlay(&mut form.description, self.description);
        overlay(&mut form.price, self.price);
        overlay(&mut form.available_stock, self.stock);
    }
}

#[derive(ClapArgs, Debug)]
struct QuotationFields {
    /// Customer name.
    #[arg(long)]
    customer: Option<String>,

    /// Quoted total.
    #[arg(long)]
    total: Option<String>,

    /// Status (Draft, Sent, Accepted, Rejected).
    #[arg(long)]
    status: Option<String>,
}

impl FormFields for QuotationFields {
    type Form = QuotationForm;

    fn apply(self, form: &mut QuotationForm) {
        overlay(&mut form.customer_name, self.customer);
        overlay(&mut form.total_amount, self.total);
        overlay(&mut form.status, self.status);
    }
}

#[derive(ClapArgs, Debug)]
struct OrderFields {
    /// Customer reference.
    #[arg(long)]
    customer: Option<String>,

    /// Order total.
    #[arg(long)]
    total: Option<String>,

    /// Status (Pending, Processing, Completed, Cancelled).
    #[arg(long)]
    status: Option<String>,
}

impl FormFields for OrderFields {
    type Form = OrderForm;

    fn apply(self, form: &mut OrderForm) {
        overlay(&mut form.customer_id, self.customer);
        overlay(&mut form.total_amount, self.total);
        overlay(&mut form.status, self.status);
    }
}

fn overlay(slot: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *slot = value;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so RUST_LOG/VERBOSE from .env apply
    let config = Config::load();

    // Initialize logging
    let verbose = args.verbose || config.as_ref().map(|c| c.verbose).unwrap_or(false);
    let filter = if verbose {
        EnvFilter::new("techfix_admin=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.as_ref().map(|c| c.rust_log.as_str()).unwrap_or("info"))
        })
    };

    let fmt_layer = if args.json_logs {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry().with(fmt_layer).with(filter).init();

    // Initialize metrics
    metrics::init_metrics();

    if let Command::CheckConfig = args.command {
        return cmd_check_config(config);
    }

    let mut config = config.map_err(AdminError::Config)?;
    config.validate().map_err(AdminError::InvalidConfig)?;
    if let Some(policy) = &args.on_unauthorized {
        config.set_unauthorized_policy(policy).map_err(AdminError::InvalidConfig)?;
    }
    debug!(session_file = %config.session_file.display(), policy = %config.unauthorized_policy, "Configuration loaded");

    let session = Session::file_backed(config.session_file.clone());
    let api = ApiClient::new(&config, session)?;

    match args.command {
        Command::Login { username, password } => cmd_login(&config, api, &username, &password).await,
        Command::Logout => cmd_logout(&config, api),
        Command::Register {
            username,
            email,
            password,
        } => cmd_register(&config, api, &username, &email, &password).await,
        Command::Status => cmd_status(&api),
        Command::Components { action } => {
            let backends = Backends::new(&config, api)?;
            run_action(&backends.components, action.into()).await
        }
        Command::Quotations { action } => {
            let backends = Backends::new(&config, api)?;
            run_action(&backends.quotations, action.into()).await
        }
        Command::Orders { action } => {
            let backends = Backends::new(&config, api)?;
            run_action(&backends.orders, action.into()).await
        }
        Command::CheckConfig => Ok(()),
    }
}

/// Check configuration validity.
fn cmd_check_config(config: Result<Config, envy::Error>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("TECHFIX ADMIN - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match config {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    for (name, url) in config.service_urls() {
        println!("  {:<22} {}", name, url);
    }
    println!("  Session File:          {}", config.session_file.display());
    println!("  On 401:                {}", config.unauthorized_policy);
    println!(
        "  Timeouts:              {}ms request, {}ms connect",
        config.http_timeout_ms, config.connect_timeout_ms
    );
    if config.accept_invalid_certs {
        println!("  WARNING: TLS certificate validation is disabled");
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

fn auth_client(config: &Config, api: ApiClient) -> Result<AuthClient, AdminError> {
    let endpoint = ServiceEndpoint::parse(Service::Auth, &config.auth_service_url)?;
    AuthClient::new(api, endpoint)
}

async fn cmd_login(config: &Config, api: ApiClient, username: &str, password: &str) -> anyhow::Result<()> {
    let auth = auth_client(config, api)?;
    match auth.login(username, password).await {
        Ok(LoginOutcome::Authenticated) => {
            println!("{}", Notice::success("Login successful!"));
            Ok(())
        }
        Ok(LoginOutcome::NoToken) => {
            println!("{}", Notice::error("Login failed: No token received"));
            Err(anyhow::anyhow!("No token received"))
        }
        Err(AdminError::Api(err)) => {
            let failure = LoginFailure::from(err);
            println!("{}", Notice::error(failure.message()));
            Err(anyhow::anyhow!("Login failed"))
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_logout(config: &Config, api: ApiClient) -> anyhow::Result<()> {
    auth_client(config, api)?.logout()?;
    info!("Logged out");
    println!("{}", Notice::success("Logged out."));
    Ok(())
}

async fn cmd_register(
    config: &Config,
    api: ApiClient,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let auth = auth_client(config, api)?;
    match auth.register(username, email, password).await {
        Ok(()) => {
            println!("{}", Notice::success("Registration successful! You can now log in."));
            Ok(())
        }
        Err(err) => {
            println!("{}", Notice::from_admin_error("registering", "account", &err));
            Err(anyhow::anyhow!("Registration failed"))
        }
    }
}

fn cmd_status(api: &ApiClient) -> anyhow::Result<()> {
    match api.session().state() {
        CredentialState::Present => println!("Logged in (token stored)."),
        CredentialState::Absent => println!("Not logged in."),
    }
    Ok(())
}

async fn run_action<F>(
    client: &ResourceClient<<F::Form as RecordForm>::Record>,
    action: Action<F>,
) -> anyhow::Result<()>
where
    F: FormFields,
    <F::Form as RecordForm>::Record: Render,
{
    match action {
        Action::List => {
            let view = ListView::load(client).await;
            print!("{}", view);
            Ok(())
        }
        Action::Show(id) => {
            let view = DetailView::load(client, id).await;
            print!("{}", view);
            match view.record() {
                Some(_) => Ok(()),
                None => Err(anyhow::anyhow!("Could not load record")),
            }
        }
        Action::Add(fields) => {
            let mut form = F::Form::default();
            fields.apply(&mut form);
            report(submit_create(client, &form).await)
        }
        Action::Edit(id, fields) => {
            let view = DetailView::load(client, id.clone()).await;
            let Some(base) = view.record().cloned() else {
                print!("{}", view);
                return Err(anyhow::anyhow!("Could not load record"));
            };
            let mut form = F::Form::from_record(&base);
            fields.apply(&mut form);
            report(submit_update(client, &id, &base, &form).await)
        }
        Action::Delete(id) => {
            let mut view = ListView::load(client).await;
            view.delete(client, &id).await;
            let failed = view.notice().map(Notice::is_error).unwrap_or(false);
            print!("{}", view);
            if failed {
                Err(anyhow::anyhow!("Delete failed"))
            } else {
                Ok(())
            }
        }
    }
}

fn report(notice: Notice) -> anyhow::Result<()> {
    println!("{}", notice);
    if notice.is_error() {
        Err(anyhow::anyhow!("{}", notice.text))
    } else {
        Ok(())
    }
}
