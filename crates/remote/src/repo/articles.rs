use crate::{expect_success, file_part, read_json, Api};
use domain::{Article, ArticleId, ArticlePreview, NewArticle, UserId};
use reqwest::multipart::Form;

impl Api {
    pub async fn list_articles(&self, category: Option<&str>) -> anyhow::Result<Vec<ArticlePreview>> {
        let url = match category {
            Some(c) => self.endpoint(&["articles", "category", c])?,
            None => self.endpoint(&["articles"])?,
        };
        read_json(self.http.get(url).send().await?).await
    }

    pub async fn get_article(&self, id: &ArticleId) -> anyhow::Result<Article> {
        let resp = self
            .http
            .get(self.endpoint(&["articles", id.as_str()])?)
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn article_categories(&self) -> anyhow::Result<Vec<String>> {
        let resp = self
            .http
            .get(self.endpoint(&["articles", "categories"])?)
            .send()
            .await?;
        read_json(resp).await
    }

    /// Only administrators may publish; the service answers 403 otherwise.
    pub async fn create_article(
        &self,
        article: &NewArticle,
        author: &UserId,
    ) -> anyhow::Result<Article> {
        let mut form = Form::new()
            .text("title", article.title.trim().to_string())
            .text("summary", article.summary.trim().to_string())
            .text("content", article.content.clone())
            .text("category", article.category.clone())
            .text("userId", author.to_string());
        if let Some(cover) = &article.cover_image {
            form = form.part("coverImage", file_part(cover)?);
        }
        let resp = self
            .http
            .post(self.endpoint(&["articles"])?)
            .multipart(form)
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn delete_article(&self, id: &ArticleId, user: &UserId) -> anyhow::Result<()> {
        let resp = self
            .http
            .delete(self.endpoint(&["articles", id.as_str()])?)
            .query(&[("userId", user.as_str())])
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }
}
