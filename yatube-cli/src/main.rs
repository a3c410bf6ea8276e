use clap::Parser;
use yatube_client::{PostEdit, PostView, TokenStore, YatubeApi, YatubeClient};

#[derive(Parser, Debug)]
#[command(name = "yatube", about = "Command line client for the Yatube API")]
struct Cli {
    #[clap(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Where the access/refresh tokens are kept between runs.
    #[clap(long, default_value = ".yatube_token")]
    token_file: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    Signup {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Login {
        #[clap(long)]
        username: String,
        #[clap(long)]
        password: String,
    },
    Refresh,
    Feed {
        #[clap(long)]
        page: Option<u32>,
    },
    GroupFeed {
        slug: String,
        #[clap(long)]
        page: Option<u32>,
    },
    Profile {
        username: String,
        #[clap(long)]
        page: Option<u32>,
    },
    FollowFeed {
        #[clap(long)]
        page: Option<u32>,
    },
    Post {
        username: String,
        id: i64,
    },
    CreatePost {
        #[clap(long)]
        text: String,
        #[clap(long)]
        group: Option<i64>,
        #[clap(long)]
        image: Option<String>,
    },
    EditPost {
        id: i64,
        #[clap(long)]
        text: Option<String>,
        #[clap(long, conflicts_with = "no_group")]
        group: Option<i64>,
        /// Detach the post from its group.
        #[clap(long)]
        no_group: bool,
        #[clap(long)]
        image: Option<String>,
    },
    DeletePost {
        id: i64,
    },
    Comment {
        post_id: i64,
        #[clap(long)]
        text: String,
    },
    Comments {
        post_id: i64,
    },
    Groups,
    Follow {
        username: String,
    },
    Unfollow {
        username: String,
    },
    Follows {
        #[clap(long)]
        search: Option<String>,
    },
}

fn print_posts(items: &[PostView], number: u32, num_pages: u32) {
    for post in items {
        println!("{}", post);
    }
    println!("-- page {} of {}", number, num_pages);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let mut client = YatubeClient::connect(&args.server, TokenStore::new(args.token_file))?;

    match args.command {
        Command::Signup {
            username,
            email,
            password,
        } => {
            client.signup(username, email, password).await?;
            println!("Successfully registered!");
        }
        Command::Login { username, password } => {
            client.login(username, password).await?;
            println!("Successfully logged in!");
        }
        Command::Refresh => {
            client.refresh().await?;
            println!("Access token refreshed");
        }
        Command::Feed { page } => {
            let page = client.home_feed(page).await?;
            print_posts(&page.items, page.number, page.num_pages);
        }
        Command::GroupFeed { slug, page } => {
            let feed = client.group_feed(&slug, page).await?;
            println!("{}", feed.group);
            print_posts(&feed.page.items, feed.page.number, feed.page.num_pages);
        }
        Command::Profile { username, page } => {
            let feed = client.profile(&username, page).await?;
            println!("{} - {} posts", feed.profile, feed.posts_count);
            if let Some(following) = feed.following {
                println!("following: {}", following);
            }
            print_posts(&feed.page.items, feed.page.number, feed.page.num_pages);
        }
        Command::FollowFeed { page } => {
            let page = client.follow_feed(page).await?;
            print_posts(&page.items, page.number, page.num_pages);
        }
        Command::Post { username, id } => {
            let detail = client.post_detail(&username, id).await?;
            println!("{}", detail.post);
            for comment in detail.comments {
                println!("  {}", comment);
            }
        }
        Command::CreatePost { text, group, image } => {
            let post = client.create_post(text, group, image).await?;
            println!("Post created! ID: {}", post.id);
        }
        Command::EditPost {
            id,
            text,
            group,
            no_group,
            image,
        } => {
            let edit = PostEdit {
                text,
                group: if no_group { Some(None) } else { group.map(Some) },
                image: image.map(Some),
            };
            let post = client.edit_post(id, edit).await?;
            println!("Post updated: {}", post);
        }
        Command::DeletePost { id } => {
            client.delete_post(id).await?;
            println!("Post deleted!");
        }
        Command::Comment { post_id, text } => {
            let comment = client.add_comment(post_id, text).await?;
            println!("Comment added: {}", comment);
        }
        Command::Comments { post_id } => {
            for comment in client.comments(post_id).await? {
                println!("{}", comment);
            }
        }
        Command::Groups => {
            for group in client.groups().await? {
                println!("{}", group);
            }
        }
        Command::Follow { username } => {
            let edge = client.follow(username).await?;
            println!("Now following: {}", edge);
        }
        Command::Unfollow { username } => {
            client.unfollow(&username).await?;
            println!("Unfollowed {}", username);
        }
        Command::Follows { search } => {
            for edge in client.follows(search).await? {
                println!("{}", edge);
            }
        }
    }

    Ok(())
}
