use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    entities::{actor, movie, rating_star},
    models::{Facets, MovieFilter, MoviePage, ReviewNode},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

pub fn movie_list_page(
    title: &str,
    movies: &[movie::Model],
    facets: &Facets,
    active: Option<&MovieFilter>,
) -> String {
    page(
        title,
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-6xl mx-auto px-6 py-10" {
                    (site_header())
                    div class="mt-8 grid gap-8 lg:grid-cols-4" {
                        aside class="lg:col-span-1" { (facet_sidebar(facets, active)) }
                        main class="lg:col-span-3" {
                            h1 class="text-3xl font-bold text-gray-900" { (title) }
                            @if movies.is_empty() {
                                div class="mt-6 bg-white shadow rounded-lg p-8" {
                                    p class="text-gray-600" { "No movies match." }
                                }
                            } @else {
                                div class="mt-6 grid gap-6 sm:grid-cols-2 xl:grid-cols-3" {
                                    @for movie in movies {
                                        (movie_card(movie))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn movie_detail_page(
    page_data: &MoviePage,
    facets: &Facets,
    stars: &[rating_star::Model],
) -> String {
    let movie = &page_data.movie;
    page(
        &movie.title,
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-6xl mx-auto px-6 py-10" {
                    (site_header())
                    div class="mt-8 grid gap-8 lg:grid-cols-4" {
                        aside class="lg:col-span-1" { (facet_sidebar(facets, None)) }
                        main class="lg:col-span-3 space-y-6" {
                            div class="bg-white shadow rounded-lg p-8" {
                                div class="flex gap-8" {
                                    img class="w-48 rounded-md shadow" src=(movie.poster) alt=(movie.title);
                                    div {
                                        h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                                        @if !movie.tagline.is_empty() {
                                            p class="mt-1 text-gray-500 italic" { (movie.tagline) }
                                        }
                                        (movie_facts(page_data))
                                    }
                                }
                                // Stored as pre-sanitized markup, rendered as-is.
                                div class="mt-6 prose max-w-none text-gray-700" {
                                    (PreEscaped(movie.description.clone()))
                                }
                            }

                            @if !page_data.shots.is_empty() {
                                div class="bg-white shadow rounded-lg p-8" {
                                    h2 class="text-xl font-semibold text-gray-900" { "Stills" }
                                    div class="mt-4 grid gap-4 sm:grid-cols-3" {
                                        @for shot in &page_data.shots {
                                            figure {
                                                img class="rounded-md shadow" src=(shot.image) alt=(shot.title);
                                                figcaption class="mt-1 text-sm text-gray-500" { (shot.title) }
                                            }
                                        }
                                    }
                                }
                            }

                            (rating_block(movie.id, stars))
                            (reviews_block(movie.id, &page_data.reviews))
                        }
                    }
                }
            }
            (review_script())
        },
    )
}

pub fn actor_page(actor: &actor::Model, facets: &Facets) -> String {
    page(
        &actor.name,
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-6xl mx-auto px-6 py-10" {
                    (site_header())
                    div class="mt-8 grid gap-8 lg:grid-cols-4" {
                        aside class="lg:col-span-1" { (facet_sidebar(facets, None)) }
                        main class="lg:col-span-3" {
                            div class="bg-white shadow rounded-lg p-8" {
                                div class="flex gap-8" {
                                    img class="w-48 rounded-md shadow" src=(actor.image) alt=(actor.name);
                                    div {
                                        h1 class="text-3xl font-bold text-gray-900" { (actor.name) }
                                        p class="mt-1 text-gray-500" { "Age: " (actor.age) }
                                    }
                                }
                                p class="mt-6 text-gray-700" { (actor.description) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn not_found_page() -> String {
    page(
        "Not found",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Page not found" }
                        p class="mt-4 text-gray-700" { "Nothing lives at this address." }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back to the catalog" }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Kinoteka" }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn site_header() -> Markup {
    html! {
        header class="flex items-baseline justify-between" {
            a class="text-2xl font-bold text-gray-900" href="/" { "Kinoteka" }
            p class="text-sm text-gray-500" { "A movie catalog" }
        }
    }
}

fn movie_card(movie: &movie::Model) -> Markup {
    html! {
        a class="block bg-white shadow rounded-lg overflow-hidden hover:shadow-md" href=(format!("/{}", movie.url)) {
            img class="w-full aspect-[2/3] object-cover" src=(movie.poster) alt=(movie.title);
            div class="p-4" {
                h2 class="font-semibold text-gray-900" { (movie.title) }
                @if !movie.tagline.is_empty() {
                    p class="mt-1 text-sm text-gray-500" { (movie.tagline) }
                }
                p class="mt-1 text-sm text-gray-400" { (movie.year) " · " (movie.country) }
            }
        }
    }
}

fn movie_facts(page_data: &MoviePage) -> Markup {
    let movie = &page_data.movie;
    html! {
        dl class="mt-4 grid grid-cols-[auto_1fr] gap-x-4 gap-y-1 text-sm" {
            (fact("Year", movie.year.to_string()))
            (fact("Country", movie.country.clone()))
            (fact("World premiere", movie.world_premiere.clone()))
            @if let Some(category) = &page_data.category {
                (fact("Category", category.name.clone()))
            }
            @if !page_data.genres.is_empty() {
                (fact("Genres", page_data.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>().join(", ")))
            }
            (fact("Budget", format!("${}", movie.budget)))
            (fact("Fees in USA", format!("${}", movie.fees_in_usa)))
            (fact("Fees worldwide", format!("${}", movie.fees_in_world)))
            @if !page_data.directors.is_empty() {
                dt class="text-gray-500" { "Directors" }
                dd { (people_links(&page_data.directors)) }
            }
            @if !page_data.actors.is_empty() {
                dt class="text-gray-500" { "Cast" }
                dd { (people_links(&page_data.actors)) }
            }
        }
    }
}

fn fact(label: &str, value: String) -> Markup {
    html! {
        dt class="text-gray-500" { (label) }
        dd class="text-gray-900" { (value) }
    }
}

fn people_links(people: &[actor::Model]) -> Markup {
    html! {
        @for (i, person) in people.iter().enumerate() {
            @if i > 0 { ", " }
            a class="text-blue-600 hover:text-blue-800" href=(format!("/actor/{}", urlencoding::encode(&person.name))) {
                (person.name)
            }
        }
    }
}

fn facet_sidebar(facets: &Facets, active: Option<&MovieFilter>) -> Markup {
    let empty = MovieFilter::default();
    let active = active.unwrap_or(&empty);
    html! {
        form class="bg-white shadow rounded-lg p-6" method="get" action="/filter" {
            h2 class="text-sm font-semibold uppercase tracking-wide text-gray-700" { "Year" }
            div class="mt-2 space-y-1" {
                @for year in &facets.years {
                    label class="flex items-center gap-2 text-sm text-gray-700" {
                        input type="checkbox" name="year" value=(year) checked[active.years.contains(year)];
                        (year)
                    }
                }
            }

            h2 class="mt-6 text-sm font-semibold uppercase tracking-wide text-gray-700" { "Genre" }
            div class="mt-2 space-y-1" {
                @for genre in &facets.genres {
                    label class="flex items-center gap-2 text-sm text-gray-700" {
                        input type="checkbox" name="genre" value=(genre.id) checked[active.genres.contains(&genre.id)];
                        (genre.name)
                    }
                }
            }

            button class="mt-6 w-full rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700" type="submit" {
                "Filter"
            }
        }
    }
}

fn rating_block(movie_id: i32, stars: &[rating_star::Model]) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-8" {
            h2 class="text-xl font-semibold text-gray-900" { "Your rating" }
            form id="rating-form" class="mt-4 flex items-center gap-4" data-action="/rating" {
                input type="hidden" name="movie" value=(movie_id);
                div class="flex flex-row-reverse gap-1" {
                    @for star in stars.iter().rev() {
                        label class="cursor-pointer text-2xl text-gray-300 hover:text-yellow-400" {
                            input class="sr-only" type="radio" name="star" value=(star.id);
                            "★"
                        }
                    }
                }
                span id="rating-status" class="text-sm text-gray-500" {}
            }
        }
    }
}

fn reviews_block(movie_id: i32, reviews: &[ReviewNode]) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-8" {
            h2 class="text-xl font-semibold text-gray-900" { "Reviews" }

            @if reviews.is_empty() {
                p class="mt-4 text-gray-500" { "No reviews yet. Be the first." }
            } @else {
                div class="mt-4 space-y-4" {
                    @for node in reviews {
                        (review_item(node))
                    }
                }
            }

            form class="mt-8 space-y-4" method="post" action=(format!("/review/{movie_id}")) {
                input type="hidden" name="parent" id="review-parent" value="";
                p id="reply-note" class="hidden text-sm text-gray-500" {
                    "Replying to " span id="reply-name" {} " · "
                    a class="text-blue-600 hover:text-blue-800" href="#" onclick="clearReply(); return false" { "cancel" }
                }
                div class="grid gap-4 sm:grid-cols-2" {
                    input class="rounded-md border border-gray-300 px-3 py-2" name="name" placeholder="Your name" required maxlength="100";
                    input class="rounded-md border border-gray-300 px-3 py-2" type="email" name="email" placeholder="Email" required;
                }
                textarea class="w-full rounded-md border border-gray-300 px-3 py-2" name="text" rows="4" placeholder="Your review" required maxlength="5000" {}
                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Post review" }
            }
        }
    }
}

fn review_item(node: &ReviewNode) -> Markup {
    let review = &node.review;
    html! {
        div class="border-l-2 border-gray-200 pl-4" {
            div class="flex items-baseline gap-3" {
                span class="font-semibold text-gray-900" { (review.name) }
                a class="text-xs text-blue-600 hover:text-blue-800" href="#review-parent"
                    onclick=(format!("setReply({}, '{}'); return false", review.id, review.name.replace('\'', ""))) {
                    "Reply"
                }
            }
            p class="mt-1 text-gray-700 whitespace-pre-line" { (review.text) }
            @if !node.replies.is_empty() {
                div class="mt-3 space-y-3" {
                    @for reply in &node.replies {
                        (review_item(reply))
                    }
                }
            }
        }
    }
}

fn review_script() -> Markup {
    PreEscaped(
        r#"<script>
function setReply(id, name) {
  document.getElementById('review-parent').value = id;
  document.getElementById('reply-name').innerText = name;
  document.getElementById('reply-note').classList.remove('hidden');
}
function clearReply() {
  document.getElementById('review-parent').value = '';
  document.getElementById('reply-note').classList.add('hidden');
}
const ratingForm = document.getElementById('rating-form');
if (ratingForm) {
  ratingForm.addEventListener('change', async () => {
    const resp = await fetch(ratingForm.dataset.action, {
      method: 'POST',
      headers: {'Content-Type': 'application/x-www-form-urlencoded'},
      body: new URLSearchParams(new FormData(ratingForm)),
    });
    document.getElementById('rating-status').innerText =
      resp.ok ? 'Saved' : 'Could not save your vote';
  });
}
</script>"#
            .to_string(),
    )
}
