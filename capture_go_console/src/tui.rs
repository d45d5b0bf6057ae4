use capture_go::coord::{BOARD_SIZE, Coord, col_to_human};
use capture_go::force::Force;
use capture_go::game::{GameSnapshot, GameStatus};
use capture_go::grid::Grid;
use capture_go::role::Role;
use console::Style;
use itertools::Itertools;


fn stone_pictogram(force: Force) -> char {
    match force {
        Force::Black => '●',
        Force::White => '○',
    }
}

fn format_cell(ch: char) -> String { format!(" {} ", ch) }

fn render_col_header() -> String {
    let cols = (0..BOARD_SIZE).map(|col| format_cell(col_to_human(col))).join("");
    format!("    {}\n", cols)
}

// Row 0 is at the bottom, so that "a1" is the lower-left corner.
fn render_grid(grid: &Grid) -> String {
    let board_style = Style::new().color256(233).on_color256(179);
    let mut ret = render_col_header();
    for row in (0..BOARD_SIZE).rev() {
        let cells = (0..BOARD_SIZE)
            .map(|col| {
                let coord = Coord::new(row, col).unwrap();
                format_cell(grid[coord].map_or('·', stone_pictogram))
            })
            .join("");
        ret.push_str(&format!(
            "{:>3} {} {}\n",
            row + 1,
            board_style.apply_to(cells),
            row + 1
        ));
    }
    ret.push_str(&render_col_header());
    ret
}

fn render_scores(game: &GameSnapshot) -> String {
    game.scores
        .iter()
        .map(|(force, score)| format!("{} {} {}", stone_pictogram(force), force.name(), score))
        .join("   ")
}

fn render_status(game: &GameSnapshot, role: Option<Role>) -> String {
    let my_force = role.and_then(Role::force);
    match game.status {
        GameStatus::Active if my_force == Some(game.turn) => {
            Style::new().bold().apply_to("Your move").to_string()
        }
        GameStatus::Active => format!("{} to move", game.turn.name()),
        GameStatus::Victory(winner) => {
            let text = if my_force == Some(winner) {
                "You win! New game starts shortly".to_owned()
            } else {
                format!("{} wins! New game starts shortly", winner.name())
            };
            Style::new().magenta().apply_to(text).to_string()
        }
    }
}

fn render_role(role: Option<Role>) -> String {
    match role {
        Some(Role::Player(force)) => format!("Playing {}", force.name()),
        Some(Role::Spectator) => "Spectating".to_owned(),
        None => "Connecting...".to_owned(),
    }
}

pub fn render_game(game: &GameSnapshot, role: Option<Role>) -> String {
    format!(
        "{}\n{}\n\n{}\n{}\n",
        render_grid(&game.board),
        render_scores(game),
        render_role(role),
        render_status(game, role),
    )
}
